use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Webhook-Timestamp";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn deposit_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = header_str(&headers, SIGNATURE_HEADER);
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);

    tracing::debug!(timestamp, body_size = body.len(), "Deposit callback received");

    state
        .incoming
        .process_deposit_callback(&body, signature, timestamp)?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::message("success", "Deposit Callback received")),
    ))
}
