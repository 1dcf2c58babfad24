use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::db::queries;
use crate::error::AppError;
use crate::handlers::{path_id, ApiResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn invalid_body(_: JsonRejection) -> AppError {
    AppError::BadRequest("Invalid request body".to_string())
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = queries::list_categories(&state.db).await?;

    Ok(Json(ApiResponse::success(
        "Categories retrieved successfully",
        categories,
    )))
}

pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Category")?;
    let category = queries::get_category(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(
        "Category retrieved successfully",
        category,
    )))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload.map_err(invalid_body)?;
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    let category = queries::insert_category(&state.db, input.name.trim(), &input.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Category created successfully", category)),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CategoryChanges>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Category")?;
    let Json(changes) = payload.map_err(invalid_body)?;

    let mut category = queries::get_category(&state.db, id)
        .await?
        .ok_or_else(not_found)?;
    if let Some(name) = changes.name.filter(|n| !n.trim().is_empty()) {
        category.name = name;
    }
    if let Some(description) = changes.description {
        category.description = description;
    }

    let category = queries::update_category(&state.db, &category)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(
        "Category updated successfully",
        category,
    )))
}

pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Category")?;
    if !queries::delete_category(&state.db, id).await? {
        return Err(not_found());
    }

    Ok(Json(ApiResponse::<()>::message(
        "success",
        "Category deleted successfully",
    )))
}
