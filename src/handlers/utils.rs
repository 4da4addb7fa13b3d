// handlers/utils.rs - shared lookups and checks for resource handlers

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::database::{Collection, Document, Repository};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// `Json` body whose rejections (bad syntax, wrong content type) answer
/// with the `{ success: false, error }` envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Decode a JSON request body into a typed input
pub fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

/// Parse the path id and load the document, 404 with `not_found` otherwise
pub async fn load(
    state: &AppState,
    collection: Collection,
    raw_id: &str,
    not_found: impl FnOnce(&str) -> String,
) -> Result<(Uuid, Document), ApiError> {
    let id = Repository::parse_id(raw_id)?;
    match state.repository.find_by_id(collection, id).await? {
        Some(doc) => Ok((id, doc)),
        None => Err(ApiError::not_found(not_found(raw_id))),
    }
}

/// Owner or admin, otherwise 403 "User <id> is not authorized to <action>"
pub fn ensure_can_modify(current: &CurrentUser, doc: &Document, action: &str) -> Result<(), ApiError> {
    if current.can_modify(doc) {
        Ok(())
    } else {
        tracing::debug!("User {} refused: {}", current.id, action);
        Err(ApiError::forbidden(format!(
            "User {} is not authorized to {}",
            current.id, action
        )))
    }
}
