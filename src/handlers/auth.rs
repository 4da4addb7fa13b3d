// handlers/auth.rs - /api/v1/auth handlers: sessions, profile and password reset

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::generate_jwt;
use crate::auth::password::{digest_reset_token, generate_reset_token, verify_password_blocking};
use crate::auth::session::{create_logout_cookie, create_session_cookie};
use crate::database::models::{timestamp_now, User, UserInput};
use crate::database::{Collection, Document};
use crate::error::ApiError;
use crate::filter::{Filter, FilterOp};
use crate::middleware::response::empty_object;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::email::{password_reset_message, OutgoingEmail};
use crate::state::AppState;
use crate::types::Role;

use super::utils::{ApiJson, parse_body};

const RESET_TOKEN_MINUTES: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// Sign a session token for `user_id`, set it as the `token` cookie and
/// echo it in the body
fn send_token(state: &AppState, user_id: Uuid, status: StatusCode) -> Result<Response, ApiError> {
    let security = &state.config.security;
    let token = generate_jwt(user_id, security)?;
    let cookie = create_session_cookie(&token, security);

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "token": token })),
    )
        .into_response())
}

async fn find_by_email(state: &AppState, email: &str) -> Result<Option<Document>, ApiError> {
    let mut filter = Filter::new(Collection::Users.schema());
    filter.where_eq("email", email)?;
    Ok(state.repository.find_one(Collection::Users, &filter).await?)
}

fn string_map(pairs: Vec<(&str, Value)>) -> Document {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let input: UserInput = parse_body(body)?;
    if input.role.as_deref() == Some(Role::Admin.as_str()) {
        return Err(ApiError::bad_request("Admin accounts can not be self-registered"));
    }

    let user = state
        .repository
        .create(Collection::Users, input.into_new_document())
        .await?;
    let user = User::from_document(&user)?;
    tracing::info!("Registered user {} ({})", user.id, user.role);

    send_token(&state, user.id, StatusCode::OK)
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let request: LoginRequest = parse_body(body)?;
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::bad_request("Please provide an email and password"));
    };

    let invalid = || ApiError::unauthorized("Invalid credentials");
    let Some(document) = find_by_email(&state, &email).await? else {
        tracing::warn!("Login for unknown email");
        return Err(invalid());
    };
    let user = User::from_document(&document)?;
    let hash = user.password.clone().ok_or_else(invalid)?;

    if !verify_password_blocking(password, hash).await? {
        tracing::warn!("Login with wrong password for user {}", user.id);
        return Err(invalid());
    }

    send_token(&state, user.id, StatusCode::OK)
}

/// GET /auth/logout - replace the session cookie with a short-lived blank
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, create_logout_cookie())],
        Json(json!({ "success": true, "data": empty_object() })),
    )
        .into_response()
}

/// GET /auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Object(current.profile)))
}

/// PUT /auth/updatedetails - name and email only
pub async fn update_details(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let request: DetailsRequest = parse_body(body)?;
    let changes = UserInput {
        name: request.name,
        email: request.email,
        ..UserInput::default()
    }
    .into_changes();

    let user = state.repository.update(Collection::Users, current.id, changes).await?;
    Ok(ApiResponse::success(Value::Object(crate::database::public_view(
        Collection::Users,
        user,
    ))))
}

/// PUT /auth/updatepassword
pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let request: PasswordChangeRequest = parse_body(body)?;
    let (Some(current_password), Some(new_password)) = (request.current_password, request.new_password) else {
        return Err(ApiError::bad_request("Please provide currentPassword and newPassword"));
    };

    let incorrect = || ApiError::unauthorized("Password is incorrect");
    let hash = current.user.password.clone().ok_or_else(incorrect)?;
    if !verify_password_blocking(current_password, hash).await? {
        return Err(incorrect());
    }

    let changes = string_map(vec![("password", Value::String(new_password))]);
    state.repository.update(Collection::Users, current.id, changes).await?;

    send_token(&state, current.id, StatusCode::OK)
}

/// POST /auth/forgotpassword - email a single-use reset link
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<String> {
    let request: ForgotPasswordRequest = parse_body(body)?;
    let email = request.email.unwrap_or_default();

    let Some(document) = find_by_email(&state, &email).await? else {
        return Err(ApiError::not_found("There is no user with that email"));
    };
    let user = User::from_document(&document)?;

    let reset_token = generate_reset_token();
    let expires = (Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES)).to_rfc3339_opts(SecondsFormat::Millis, true);
    let changes = string_map(vec![
        ("resetPasswordToken", Value::String(digest_reset_token(&reset_token))),
        ("resetPasswordExpire", Value::String(expires)),
    ]);
    state
        .repository
        .update_unchecked(Collection::Users, user.id, changes)
        .await?;

    let reset_url = format!(
        "{}://{}/api/v1/auth/resetpassword/{}",
        request_protocol(&headers),
        request_host(&headers),
        reset_token
    );
    let message = OutgoingEmail {
        to: user.email.clone(),
        subject: "Password reset token".to_string(),
        body: password_reset_message(&reset_url),
    };

    if let Err(e) = state.mailer.send(message).await {
        tracing::error!("Password reset email to user {} failed: {}", user.id, e);
        let clear = string_map(vec![("resetPasswordToken", Value::Null), ("resetPasswordExpire", Value::Null)]);
        state
            .repository
            .update_unchecked(Collection::Users, user.id, clear)
            .await?;
        return Err(ApiError::internal_server_error("Email could not be sent"));
    }

    Ok(ApiResponse::success("Email sent".to_string()))
}

/// PUT /auth/resetpassword/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let mut filter = Filter::new(Collection::Users.schema());
    filter
        .where_eq("resetPasswordToken", digest_reset_token(&reset_token))?
        .condition("resetPasswordExpire", FilterOp::Gt, timestamp_now())?;

    let Some(document) = state.repository.find_one(Collection::Users, &filter).await? else {
        return Err(ApiError::bad_request("Invalid token"));
    };
    let user = User::from_document(&document)?;

    let request: ResetPasswordRequest = parse_body(body)?;
    let changes = string_map(vec![
        ("password", request.password.map(Value::String).unwrap_or(Value::Null)),
        ("resetPasswordToken", Value::Null),
        ("resetPasswordExpire", Value::Null),
    ]);
    state.repository.update(Collection::Users, user.id, changes).await?;
    tracing::info!("Password reset for user {}", user.id);

    send_token(&state, user.id, StatusCode::OK)
}

fn request_protocol(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http")
}

fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reset_url_parts_come_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_protocol(&headers), "http");
        assert_eq!(request_host(&headers), "localhost");

        headers.insert(header::HOST, HeaderValue::from_static("devcamper.io"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(request_protocol(&headers), "https");
        assert_eq!(request_host(&headers), "devcamper.io");
    }
}
