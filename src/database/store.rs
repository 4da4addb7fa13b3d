use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::database::schema::Collection;
use crate::filter::{Filter, FilterError};

/// A stored document: a JSON object that always carries `id` and `createdAt`
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Resource not found with id of {0}")]
    InvalidId(String),

    #[error("Duplicate field value entered")]
    Duplicate,

    #[error("{collection} not found with id of {id}")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence seam for the four collections. Implementations keep each
/// single call atomic; multi-step sequences are the caller's business.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Insert a new document; `doc` must already carry `id` and `createdAt`
    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError>;

    /// Replace the document with the same `id`
    async fn replace(&self, collection: Collection, doc: Document) -> Result<Document, StoreError>;

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read the `id` of a stored document
pub fn document_id(doc: &Document) -> Result<Uuid, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| StoreError::Backend("document has no valid id".to_string()))
}

/// Key used for unique-constraint checks, `None` when any part is missing
pub fn unique_key(doc: &Document, fields: &[&str]) -> Option<Vec<String>> {
    fields
        .iter()
        .map(|f| match doc.get(*f) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .collect()
}
