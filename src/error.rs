// HTTP API Error Types
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::store::StoreError;
use crate::filter::FilterError;
use crate::observer::error::ObserverError;
use crate::services::email::EmailError;
use crate::services::geocoder::GeocodeError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Log the real cause and answer with a generic 500
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::internal_server_error("Server Error")
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) | StoreError::Duplicate => ApiError::bad_request(err.to_string()),
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::Filter(filter_err) => filter_err.into(),
            StoreError::Backend(msg) => ApiError::internal("Store backend error", msg),
            StoreError::Sqlx(sqlx_err) => ApiError::internal("SQLx error", sqlx_err),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<ObserverError> for ApiError {
    fn from(err: ObserverError) -> Self {
        match err {
            ObserverError::ValidationError(messages) => ApiError::bad_request(messages.join(", ")),
            ObserverError::BusinessError(msg) => ApiError::bad_request(msg),
            ObserverError::Store(store_err) => store_err.into(),
            ObserverError::TimeoutError(msg) => ApiError::internal("Observer timeout", msg),
            ObserverError::ServiceError(msg) => ApiError::internal("Observer service error", msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!("Rejected multipart body: {}", rejection.body_text());
        ApiError::bad_request("Please upload a file")
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(_) => ApiError::unauthorized("Not authorized to access this resource"),
            other => ApiError::internal("Session token error", other),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal("Password hashing error", err)
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoResults(query) => ApiError::not_found(format!("No location found for {}", query)),
            other => ApiError::internal("Geocoder error", other),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        tracing::error!("Email error: {}", err);
        ApiError::internal_server_error("Email could not be sent")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
