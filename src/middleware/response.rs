use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::catalog::Page;

/// Success envelope: `{"success": true, "message"?, "data", "pagination"?}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: Option<String>,
    pub pagination: Option<Page>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
            pagination: None,
            status_code: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            status_code: Some(StatusCode::CREATED),
            ..Self::success(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_pagination(mut self, page: Page) -> Self {
        self.pagination = Some(page);
        self
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
                        "error": true,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({ "success": true });
        if let Some(message) = self.message {
            envelope["message"] = json!(message);
        }
        envelope["data"] = data_value;
        if let Some(page) = self.pagination {
            envelope["pagination"] = json!(page);
        }

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_envelope_carries_message() {
        let response = ApiResponse::created(json!({ "name": "Vesta" }))
            .with_message("Asteroid successfully created")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_of(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Asteroid successfully created");
        assert_eq!(body["data"]["name"], "Vesta");
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn list_envelope_carries_pagination() {
        let response = ApiResponse::success(vec![1, 2])
            .with_pagination(Page::new(1, 2, 5))
            .into_response();
        let body = body_of(response).await;
        assert_eq!(body["pagination"]["pages"], 3);
        assert_eq!(body["pagination"]["total"], 5);
    }
}
