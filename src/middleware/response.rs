use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub count: Option<usize>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            count: None,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            count: None,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<I: Serialize> ApiResponse<Vec<I>> {
    /// Plain list envelope: `{success, count, data}`
    pub fn list(data: Vec<I>) -> Self {
        Self {
            count: Some(data.len()),
            data,
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = match self.count {
            Some(count) => json!({ "success": true, "count": count, "data": data_value }),
            None => json!({ "success": true, "data": data_value }),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Empty `data: {}` payload
pub fn empty_object() -> Value {
    json!({})
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wraps_data() {
        let response = ApiResponse::created(json!({ "id": "1" })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body(response).await, json!({ "success": true, "data": { "id": "1" } }));
    }

    #[tokio::test]
    async fn lists_carry_count() {
        let response = ApiResponse::list(vec![1, 2, 3]).into_response();
        assert_eq!(body(response).await, json!({ "success": true, "count": 3, "data": [1, 2, 3] }));
    }
}
