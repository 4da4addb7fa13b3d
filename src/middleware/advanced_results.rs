use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::database::{project, public_view, Collection, Populate};
use crate::error::ApiError;
use crate::filter::{Filter, FilterData};
use crate::state::AppState;

/// Which collection a list route serves and what to join into it
#[derive(Debug, Clone, Copy)]
pub struct ResultsSpec {
    pub collection: Collection,
    pub populate: Option<Populate>,
}

impl ResultsSpec {
    pub fn new(collection: Collection, populate: Option<Populate>) -> Self {
        Self { collection, populate }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
}

impl Pagination {
    pub fn compute(data: &FilterData, total: u64) -> Self {
        let prev = (data.start_index() > 0).then(|| PageRef {
            page: data.page - 1,
            limit: data.limit,
        });
        let next = (data.end_index() < total).then(|| PageRef {
            page: data.page + 1,
            limit: data.limit,
        });
        Self { prev, next }
    }
}

/// Envelope produced for a list route, forwarded as-is by the handler
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedResults {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

impl IntoResponse for AdvancedResults {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Run the filtered, sorted, paginated query described by the query string
/// and attach the envelope to the request
pub async fn advanced_results(
    State((state, spec)): State<(AppState, ResultsSpec)>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let pairs: Vec<(String, String)> = request
        .uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let results = query(&state, spec, &pairs).await?;
    tracing::debug!(
        "Advanced results for {}: {} item(s), pagination {:?}",
        spec.collection,
        results.count,
        results.pagination
    );

    request.extensions_mut().insert(results);
    Ok(next.run(request).await)
}

async fn query(state: &AppState, spec: ResultsSpec, pairs: &[(String, String)]) -> Result<AdvancedResults, ApiError> {
    let limits = &state.config.filter;
    let data = FilterData::from_query(pairs, limits.default_limit, limits.max_limit)?;

    let mut filter = Filter::new(spec.collection.schema());
    filter.assign(&data)?;

    let repository = &state.repository;
    let total = repository.count(spec.collection, &filter.without_paging()).await?;
    let mut docs = repository.find(spec.collection, &filter).await?;

    docs = docs
        .into_iter()
        .map(|doc| project(public_view(spec.collection, doc), filter.select_fields()))
        .collect();
    if let Some(populate) = spec.populate {
        repository.populate(populate, &mut docs).await?;
    }

    Ok(AdvancedResults {
        success: true,
        count: docs.len(),
        pagination: Pagination::compute(&data, total),
        data: docs.into_iter().map(Value::Object).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, limit: u32) -> FilterData {
        let pairs = vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        FilterData::from_query(&pairs, 10, 100).unwrap()
    }

    #[test]
    fn last_page_has_only_prev() {
        let pagination = Pagination::compute(&page(2, 10), 15);
        assert_eq!(pagination.prev, Some(PageRef { page: 1, limit: 10 }));
        assert_eq!(pagination.next, None);
    }

    #[test]
    fn first_page_has_only_next() {
        let pagination = Pagination::compute(&page(1, 10), 15);
        assert_eq!(pagination.prev, None);
        assert_eq!(pagination.next, Some(PageRef { page: 2, limit: 10 }));
    }

    #[test]
    fn single_page_has_neither() {
        let pagination = Pagination::compute(&page(1, 10), 10);
        assert_eq!(pagination, Pagination::default());
        assert_eq!(serde_json::to_value(&pagination).unwrap(), serde_json::json!({}));
    }
}
