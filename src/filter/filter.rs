use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::query::FilterData;
use super::types::{CollectionSchema, FilterOp, FilterOrderInfo, FilterWhereInfo, GeoWithin, SqlResult};

/// Typed query over one collection. Every condition, sort key and selected
/// field is checked against the collection's declared schema before it is
/// accepted.
#[derive(Debug, Clone)]
pub struct Filter {
    schema: &'static CollectionSchema,
    select_fields: Vec<String>,
    conditions: Vec<FilterWhereInfo>,
    geo: Option<GeoWithin>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Filter {
    pub fn new(schema: &'static CollectionSchema) -> Self {
        Self {
            schema,
            select_fields: vec![],
            conditions: vec![],
            geo: None,
            order_data: vec![],
            limit: None,
            offset: None,
        }
    }

    /// Apply a parsed query string. Hidden fields are refused here even
    /// though internal callers may filter on them.
    pub fn assign(&mut self, data: &FilterData) -> Result<&mut Self, FilterError> {
        for raw in &data.conditions {
            if self.schema.is_hidden(&raw.field) {
                return Err(FilterError::InvalidColumn(raw.field.clone()));
            }
            let field = self
                .schema
                .field(&raw.field)
                .ok_or_else(|| FilterError::InvalidColumn(raw.field.clone()))?;
            let value = FilterWhere::coerce_operand(field.path, field.kind, raw.operator, &raw.value)?;
            self.conditions.push(FilterWhereInfo {
                column: field.path,
                kind: field.kind,
                operator: raw.operator,
                data: value,
            });
        }
        if let Some(select) = &data.select {
            self.select(select.clone())?;
        }
        self.order(data.sort.as_deref().unwrap_or("-createdAt"))?;
        self.limit(data.limit as u64, Some(data.start_index()));
        Ok(self)
    }

    pub fn condition(
        &mut self,
        column: &str,
        operator: FilterOp,
        data: impl Into<Value>,
    ) -> Result<&mut Self, FilterError> {
        let field = self
            .schema
            .field(column)
            .ok_or_else(|| FilterError::InvalidColumn(column.to_string()))?;
        self.conditions.push(FilterWhereInfo {
            column: field.path,
            kind: field.kind,
            operator,
            data: data.into(),
        });
        Ok(self)
    }

    pub fn where_eq(&mut self, column: &str, data: impl Into<Value>) -> Result<&mut Self, FilterError> {
        self.condition(column, FilterOp::Eq, data)
    }

    pub fn select(&mut self, fields: Vec<String>) -> Result<&mut Self, FilterError> {
        if let Some(bad) = fields.iter().find(|f| !self.schema.is_selectable(f)) {
            return Err(FilterError::InvalidColumn(bad.clone()));
        }
        self.select_fields = fields;
        Ok(self)
    }

    pub fn order(&mut self, order: &str) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(self.schema, order)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64, offset: Option<u64>) -> &mut Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn geo_within(&mut self, geo: GeoWithin) -> &mut Self {
        self.geo = Some(geo);
        self
    }

    pub fn schema(&self) -> &'static CollectionSchema {
        self.schema
    }

    pub fn select_fields(&self) -> &[String] {
        &self.select_fields
    }

    /// Same predicate without projection, order or paging
    pub fn without_paging(&self) -> Self {
        Self {
            schema: self.schema,
            select_fields: vec![],
            conditions: self.conditions.clone(),
            geo: self.geo,
            order_data: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        FilterWhere::matches(&self.conditions, self.geo.as_ref(), doc)
    }

    /// Order documents in place the way `to_sql` would
    pub fn sort(&self, docs: &mut [Map<String, Value>]) {
        if !self.order_data.is_empty() {
            docs.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        }
    }

    /// Apply offset and limit to an already ordered list
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = self.offset.unwrap_or(0) as usize;
        let take = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, self.geo.as_ref())?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT doc FROM \"{}\"", self.schema.name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, self.geo.as_ref())?;
        Ok(SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.schema.name, where_clause),
            params,
        })
    }

    pub fn to_delete_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, self.geo.as_ref())?;
        Ok(SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE {}", self.schema.name, where_clause),
            params,
        })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
