pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::services::merchant::ForwardError;
use crate::services::{
    CheckoutService, IncomingService, MerchantClient, ReportService, WebhookVerifier,
};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub checkout: CheckoutService,
    pub reports: ReportService,
    pub incoming: IncomingService,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: &Config) -> Result<Self, ForwardError> {
        let merchant = MerchantClient::new(
            config.merchant_callback_url.clone(),
            config.merchant_timeout(),
        )?;
        let incoming = IncomingService::new(WebhookVerifier::new(&config.webhook), Arc::new(merchant));

        Ok(Self {
            checkout: CheckoutService::new(db.clone()),
            reports: ReportService::new(db.clone()),
            incoming,
            db,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/incoming/deposit_callback",
            post(handlers::webhook::deposit_callback),
        )
        .route("/api/checkout", post(handlers::checkout::checkout))
        .route(
            "/api/transaction/:id",
            get(handlers::checkout::get_transaction),
        )
        .route("/api/report/hari-ini", get(handlers::report::daily_report))
        .route("/api/report", get(handlers::report::report_by_date_range))
        .route(
            "/api/category",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/api/category/:id",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        .route(
            "/api/product",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route(
            "/api/product/:id",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
