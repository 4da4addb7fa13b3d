use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::session::extract_token;
use crate::auth::validate_jwt;
use crate::database::models::{doc_uuid, User};
use crate::database::store::Document;
use crate::database::{public_view, Collection};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;

const NOT_AUTHORIZED: &str = "Not authorized to access this resource";

/// Authenticated caller, attached to the request by `protect`
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
    pub user: User,
    /// Stored document without the hidden fields
    pub profile: Document,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of `doc` (by its `user` field) or an admin
    pub fn can_modify(&self, doc: &Document) -> bool {
        self.is_admin() || doc_uuid(doc, "user") == Some(self.id)
    }
}

/// Require a valid session token and attach the caller's `CurrentUser`
pub async fn protect(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(token) = extract_token(request.headers()) else {
        tracing::warn!("Rejected {}: no session token", request.uri().path());
        return Err(ApiError::unauthorized(NOT_AUTHORIZED));
    };

    let claims = validate_jwt(&token, &state.config.security).map_err(|e| {
        tracing::warn!("Rejected session token: {}", e);
        ApiError::unauthorized(NOT_AUTHORIZED)
    })?;

    let document = state
        .repository
        .find_by_id(Collection::Users, claims.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Session token for missing user {}", claims.id);
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;
    let user = User::from_document(&document)?;

    tracing::debug!("Authenticated user {} as {}", user.id, user.role);
    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        role: user.role,
        user,
        profile: public_view(Collection::Users, document),
    });
    Ok(next.run(request).await)
}

/// Reject callers whose role is not in `roles`. Must run after `protect`.
pub async fn authorize(roles: &[Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(current) = request.extensions().get::<CurrentUser>() else {
        return Err(ApiError::unauthorized(NOT_AUTHORIZED));
    };

    if !roles.contains(&current.role) {
        tracing::debug!("Role {} refused for {}", current.role, request.uri().path());
        return Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this resource",
            current.role
        )));
    }
    Ok(next.run(request).await)
}

pub async fn publisher_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&[Role::Publisher, Role::Admin], request, next).await
}

pub async fn user_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&[Role::User, Role::Admin], request, next).await
}

pub async fn admin_only(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&[Role::Admin], request, next).await
}
