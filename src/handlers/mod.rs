pub mod category;
pub mod checkout;
pub mod product;
pub mod report;
pub mod webhook;

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

/// Envelope shared by every endpoint: `{status, message, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn message(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            data: None,
        }
    }
}

/// Numeric `:id` path segment; anything else is a 400 in the usual envelope.
pub(crate) fn path_id(path: Result<Path<i32>, PathRejection>, entity: &str) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub db: String,
    pub version: String,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let connected = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    let health = HealthStatus {
        db: if connected { "connected" } else { "disconnected" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if connected {
        (StatusCode::OK, Json(ApiResponse::success("API Running", health)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                status: "failed".to_string(),
                message: "Database unreachable".to_string(),
                data: Some(health),
            }),
        )
    }
}
