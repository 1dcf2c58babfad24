use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::db::models::{StockSnapshot, Transaction, TransactionDetail};
use crate::db::queries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("product id {id} not found")]
    ProductNotFound { id: i32 },

    #[error("insufficient stock for product '{name}' (available: {available}, requested: {requested})")]
    InsufficientStock {
        product_id: i32,
        name: String,
        available: i32,
        requested: i64,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Turns a cart into a committed sale in one database transaction:
/// validate every line, price it, deduct stock, then persist the sale.
/// Any failure rolls the whole cart back.
#[derive(Clone)]
pub struct CheckoutService {
    pool: PgPool,
}

impl CheckoutService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn checkout(&self, items: &[CheckoutItem]) -> Result<Transaction, CheckoutError> {
        let requested = validate_items(items)?;

        // Dropping `tx` on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        // Locks are taken in ascending product id order so two carts sharing
        // products cannot deadlock each other.
        let mut products: HashMap<i32, StockSnapshot> = HashMap::with_capacity(requested.len());
        for (&product_id, &quantity) in &requested {
            let product = queries::lock_product_stock(&mut tx, product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound { id: product_id })?;

            if i64::from(product.stock) < quantity {
                tracing::warn!(
                    product_id,
                    available = product.stock,
                    requested = quantity,
                    "Checkout rejected: insufficient stock"
                );
                return Err(CheckoutError::InsufficientStock {
                    product_id,
                    name: product.name,
                    available: product.stock,
                    requested: quantity,
                });
            }

            products.insert(product_id, product);
        }

        let (total_amount, mut details) = price_items(items, &products)?;

        for item in items {
            queries::decrement_stock(&mut tx, item.product_id, item.quantity).await?;
        }

        let mut transaction = queries::insert_transaction(&mut tx, total_amount).await?;
        for detail in &mut details {
            detail.transaction_id = transaction.id;
        }
        queries::insert_transaction_details(&mut tx, &details).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = transaction.id,
            total_amount,
            lines = details.len(),
            "Checkout committed"
        );

        transaction.details = details;
        Ok(transaction)
    }
}

/// Rejects empty carts and non-positive quantities, and sums the requested
/// quantity per product (a product may appear on several lines).
fn validate_items(items: &[CheckoutItem]) -> Result<BTreeMap<i32, i64>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::InvalidRequest(
            "items must not be empty".to_string(),
        ));
    }

    let mut requested = BTreeMap::new();
    for item in items {
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidRequest(format!(
                "quantity for product id {} must be greater than 0",
                item.product_id
            )));
        }
        *requested.entry(item.product_id).or_insert(0i64) += i64::from(item.quantity);
    }

    Ok(requested)
}

/// Builds one detail per cart line, in cart order, priced from the snapshot
/// read inside the transaction. `transaction_id` is filled in after insert.
fn price_items(
    items: &[CheckoutItem],
    products: &HashMap<i32, StockSnapshot>,
) -> Result<(i64, Vec<TransactionDetail>), CheckoutError> {
    let mut total_amount: i64 = 0;
    let mut details = Vec::with_capacity(items.len());

    for item in items {
        let product = products
            .get(&item.product_id)
            .ok_or(CheckoutError::ProductNotFound { id: item.product_id })?;

        let subtotal = product
            .price
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(|| CheckoutError::InvalidRequest("order total is too large".to_string()))?;
        total_amount = total_amount
            .checked_add(subtotal)
            .ok_or_else(|| CheckoutError::InvalidRequest("order total is too large".to_string()))?;

        details.push(TransactionDetail {
            transaction_id: 0,
            product_id: item.product_id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            subtotal,
        });
    }

    Ok((total_amount, details))
}
