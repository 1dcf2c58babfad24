use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::IntoResponse,
    Json,
};

use crate::db::queries;
use crate::error::AppError;
use crate::handlers::{path_id, ApiResponse};
use crate::services::checkout::CheckoutRequest;
use crate::AppState;

pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected checkout body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let transaction = state.checkout.checkout(&request.items).await?;

    Ok(Json(ApiResponse::success(
        "Transaction created successfully",
        transaction,
    )))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Transaction")?;
    let transaction = queries::get_transaction(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;

    Ok(Json(ApiResponse::success(
        "Transaction retrieved successfully",
        transaction,
    )))
}
