// handlers/users.rs - /api/v1/users handlers (admin only)

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::database::models::UserInput;
use crate::database::{public_view, Collection};
use crate::middleware::response::empty_object;
use crate::middleware::{AdvancedResults, ApiResponse, ApiResult};
use crate::state::AppState;

use super::utils::{ApiJson, load, parse_body};

fn not_found(id: &str) -> String {
    format!("No user with the id of {}", id)
}

fn public_user(doc: crate::database::Document) -> Value {
    Value::Object(public_view(Collection::Users, doc))
}

/// GET /users
pub async fn list(Extension(results): Extension<AdvancedResults>) -> AdvancedResults {
    results
}

/// GET /users/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let (_, user) = load(&state, Collection::Users, &id, not_found).await?;
    Ok(ApiResponse::success(public_user(user)))
}

/// POST /users - admins may assign any role
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<Value>) -> ApiResult<Value> {
    let input: UserInput = parse_body(body)?;
    let user = state
        .repository
        .create(Collection::Users, input.into_new_document())
        .await?;
    Ok(ApiResponse::created(public_user(user)))
}

/// PUT /users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let (id, _) = load(&state, Collection::Users, &id, not_found).await?;
    let input: UserInput = parse_body(body)?;
    let user = state
        .repository
        .update(Collection::Users, id, input.into_changes())
        .await?;
    Ok(ApiResponse::success(public_user(user)))
}

/// DELETE /users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let (id, _) = load(&state, Collection::Users, &id, not_found).await?;
    state.repository.delete(Collection::Users, id).await?;
    Ok(ApiResponse::success(empty_object()))
}
