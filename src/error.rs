use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::handlers::ApiResponse;
use crate::services::checkout::CheckoutError;
use crate::services::incoming::WebhookError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to process checkout: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("{0}")]
    Webhook(#[from] WebhookError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Unknown products and short stock stay 500s, matching the
            // established API contract.
            AppError::Checkout(CheckoutError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Checkout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Webhook(WebhookError::InvalidSignature) => StatusCode::UNAUTHORIZED,
            AppError::Webhook(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Webhook senders get "error"; the POS endpoints report "failed".
    fn status_label(&self) -> &'static str {
        match self {
            AppError::Webhook(_) => "error",
            _ => "failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = Json(ApiResponse::<()>::message(self.status_label(), self.to_string()));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation("Invalid input".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status_code() {
        let error = AppError::NotFound("Product not found".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_error_status_code() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_checkout_domain_errors_are_internal() {
        let not_found = AppError::Checkout(CheckoutError::ProductNotFound { id: 9 });
        assert_eq!(not_found.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let short = AppError::Checkout(CheckoutError::InsufficientStock {
            product_id: 1,
            name: "Kopi".to_string(),
            available: 3,
            requested: 5,
        });
        assert_eq!(short.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let empty = AppError::Checkout(CheckoutError::InvalidRequest("items must not be empty".to_string()));
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_signature_is_unauthorized() {
        let error = AppError::from(WebhookError::InvalidSignature);
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.status_label(), "error");
    }

    #[tokio::test]
    async fn test_invalid_signature_response_body() {
        let response = AppError::from(WebhookError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "invalid signature");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_checkout_error_response_body() {
        let response = AppError::Checkout(CheckoutError::ProductNotFound { id: 42 }).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "Failed to process checkout: product id 42 not found");
    }
}
