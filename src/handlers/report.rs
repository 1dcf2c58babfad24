use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::services::report::parse_report_date;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn daily_report(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.reports.daily().await?;

    Ok(Json(ApiResponse::success(
        "Daily sales report retrieved successfully",
        report,
    )))
}

pub async fn report_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::BadRequest(
            "start_date and end_date query parameters are required".to_string(),
        ));
    };

    let start = parse_report_date("start_date", &start)?;
    let end = parse_report_date("end_date", &end)?;
    let report = state.reports.by_date_range(start, end).await?;

    Ok(Json(ApiResponse::success(
        "Sales report retrieved successfully",
        report,
    )))
}
