// handlers/reviews.rs - /api/v1/reviews and /api/v1/bootcamps/:id/reviews handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::database::models::ReviewInput;
use crate::database::{Collection, Populate, Repository};
use crate::filter::Filter;
use crate::middleware::response::empty_object;
use crate::middleware::{AdvancedResults, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

use super::utils::{ApiJson, ensure_can_modify, load, parse_body};

fn not_found(id: &str) -> String {
    format!("No review with the id of {}", id)
}

/// GET /reviews
pub async fn list(Extension(results): Extension<AdvancedResults>) -> AdvancedResults {
    results
}

/// GET /bootcamps/:id/reviews
pub async fn list_for_bootcamp(State(state): State<AppState>, Path(bootcamp_id): Path<String>) -> ApiResult<Vec<Value>> {
    let bootcamp_id = Repository::parse_id(&bootcamp_id)?;

    let mut filter = Filter::new(Collection::Reviews.schema());
    filter.where_eq("bootcamp", bootcamp_id.to_string())?;
    filter.order("-createdAt")?;

    let reviews = state.repository.find(Collection::Reviews, &filter).await?;
    Ok(ApiResponse::list(reviews.into_iter().map(Value::Object).collect()))
}

/// GET /reviews/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let (_, review) = load(&state, Collection::Reviews, &id, not_found).await?;
    let mut reviews = [review];
    state.repository.populate(Populate::Bootcamp, &mut reviews).await?;
    let [review] = reviews;
    Ok(ApiResponse::success(Value::Object(review)))
}

/// POST /bootcamps/:id/reviews - one review per user and bootcamp
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (bootcamp_id, _) = load(&state, Collection::Bootcamps, &bootcamp_id, |id| {
        format!("No bootcamp with the id of {}", id)
    })
    .await?;

    let input: ReviewInput = parse_body(body)?;
    let review = state
        .repository
        .create(
            Collection::Reviews,
            input.into_new_document(&bootcamp_id.to_string(), &current.id.to_string()),
        )
        .await?;
    Ok(ApiResponse::created(Value::Object(review)))
}

/// PUT /reviews/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Reviews, &id, not_found).await?;
    ensure_can_modify(&current, &existing, &format!("update review {}", id))?;

    let input: ReviewInput = parse_body(body)?;
    let review = state
        .repository
        .update(Collection::Reviews, id, input.into_changes())
        .await?;
    Ok(ApiResponse::success(Value::Object(review)))
}

/// DELETE /reviews/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let (id, existing) = load(&state, Collection::Reviews, &id, not_found).await?;
    ensure_can_modify(&current, &existing, &format!("delete review {}", id))?;

    state.repository.delete(Collection::Reviews, id).await?;
    Ok(ApiResponse::success(empty_object()))
}
