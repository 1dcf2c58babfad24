use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::db::models::Product;
use crate::db::queries;
use crate::error::AppError;
use crate::handlers::{path_id, ApiResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i32,
    pub category_id: Option<i32>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
}

impl NewProduct {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        check_amounts(Some(self.price), Some(self.stock))
    }
}

impl ProductChanges {
    fn apply(self, mut product: Product) -> Result<Product, AppError> {
        check_amounts(self.price, self.stock)?;

        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if self.category_id.is_some() {
            product.category_id = self.category_id;
        }
        Ok(product)
    }
}

fn check_amounts(price: Option<i64>, stock: Option<i32>) -> Result<(), AppError> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::Validation("stock must not be negative".to_string()));
    }
    Ok(())
}

fn invalid_body(_: JsonRejection) -> AppError {
    AppError::BadRequest("Invalid request body".to_string())
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let name = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let products = queries::list_products(&state.db, name).await?;

    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        products,
    )))
}

pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Product")?;
    let product = queries::get_product(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(
        "Product retrieved successfully",
        product,
    )))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload.map_err(invalid_body)?;
    input.validate()?;

    let product = queries::insert_product(
        &state.db,
        input.name.trim(),
        input.price,
        input.stock,
        input.category_id,
    )
    .await?;

    tracing::info!(product_id = product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created successfully", product)),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ProductChanges>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Product")?;
    let Json(changes) = payload.map_err(invalid_body)?;

    let existing = queries::get_product(&state.db, id)
        .await?
        .ok_or_else(not_found)?;
    let product = queries::update_product(&state.db, &changes.apply(existing)?)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(
        "Product updated successfully",
        product,
    )))
}

pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path, "Product")?;
    if !queries::delete_product(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(product_id = id, "Product deleted");

    Ok(Json(ApiResponse::<()>::message(
        "success",
        "Product deleted successfully",
    )))
}
