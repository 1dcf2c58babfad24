use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder, Result, Transaction as SqlxTransaction};

use crate::db::models::{
    Category, Product, SalesReport, StockSnapshot, TopProduct, Transaction, TransactionDetail,
};

// --- Category Queries ---

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, deleted_at FROM category WHERE deleted_at IS NULL ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &PgPool, id: i32) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, deleted_at FROM category WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_category(pool: &PgPool, name: &str, description: &str) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO category (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, deleted_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_category(pool: &PgPool, category: &Category) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE category SET name = $2, description = $3
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, description, deleted_at
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.description)
    .fetch_optional(pool)
    .await
}

/// Soft delete. Returns false when the category does not exist or is already deleted.
pub async fn delete_category(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE category SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// --- Product Queries ---

pub async fn list_products(pool: &PgPool, name: Option<&str>) -> Result<Vec<Product>> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, category_id, deleted_at
        FROM product
        WHERE deleted_at IS NULL
        AND ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
        ORDER BY id
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await
}

pub async fn get_product(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, category_id, deleted_at
        FROM product
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_product(
    pool: &PgPool,
    name: &str,
    price: i64,
    stock: i32,
    category_id: Option<i32>,
) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO product (name, price, stock, category_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, price, stock, category_id, deleted_at
        "#,
    )
    .bind(name)
    .bind(price)
    .bind(stock)
    .bind(category_id)
    .fetch_one(pool)
    .await
}

pub async fn update_product(pool: &PgPool, product: &Product) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
        r#"
        UPDATE product SET name = $2, price = $3, stock = $4, category_id = $5
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, price, stock, category_id, deleted_at
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.category_id)
    .fetch_optional(pool)
    .await
}

/// Soft delete. Returns false when the product does not exist or is already deleted.
pub async fn delete_product(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE product SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// --- Checkout Queries ---

/// Reads a live product's name, price and stock and row-locks it until the
/// enclosing transaction ends, so concurrent checkouts of the same product
/// serialize here instead of both passing validation.
pub async fn lock_product_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: i32,
) -> Result<Option<StockSnapshot>> {
    sqlx::query_as::<_, StockSnapshot>(
        r#"
        SELECT id, name, price, stock
        FROM product
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn decrement_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: i32,
    quantity: i32,
) -> Result<()> {
    sqlx::query("UPDATE product SET stock = stock - $1 WHERE id = $2")
        .bind(quantity)
        .bind(product_id)
        .execute(&mut **executor)
        .await?;

    Ok(())
}

pub async fn insert_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    total_amount: i64,
) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (total_amount)
        VALUES ($1)
        RETURNING id, total_amount, created_at, deleted_at
        "#,
    )
    .bind(total_amount)
    .fetch_one(&mut **executor)
    .await
}

/// Writes every line item of one transaction in a single multi-row INSERT.
pub async fn insert_transaction_details(
    executor: &mut SqlxTransaction<'_, Postgres>,
    details: &[TransactionDetail],
) -> Result<()> {
    if details.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO transaction_details (transaction_id, product_id, product_name, quantity, subtotal) ",
    );
    builder.push_values(details, |mut row, detail| {
        row.push_bind(detail.transaction_id)
            .push_bind(detail.product_id)
            .push_bind(detail.product_name.clone())
            .push_bind(detail.quantity)
            .push_bind(detail.subtotal);
    });

    builder.build().execute(&mut **executor).await?;
    Ok(())
}

pub async fn get_transaction(pool: &PgPool, id: i32) -> Result<Option<Transaction>> {
    let transaction = sqlx::query_as::<_, Transaction>(
        "SELECT id, total_amount, created_at, deleted_at FROM transactions WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut transaction) = transaction else {
        return Ok(None);
    };

    transaction.details = sqlx::query_as::<_, TransactionDetail>(
        r#"
        SELECT transaction_id, product_id, product_name, quantity, subtotal
        FROM transaction_details
        WHERE transaction_id = $1
        ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(transaction))
}

// --- Report Queries ---

pub async fn sales_report(
    pool: &PgPool,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<SalesReport> {
    let (total_revenue, total_transaksi): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)::BIGINT, COUNT(*)
        FROM transactions
        WHERE created_at >= $1 AND created_at < $2
        AND deleted_at IS NULL
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    let produk_terlaris = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT p.name AS nama, SUM(td.quantity)::BIGINT AS qty_terjual
        FROM transaction_details td
        INNER JOIN transactions t ON td.transaction_id = t.id
        INNER JOIN product p ON td.product_id = p.id
        WHERE t.created_at >= $1 AND t.created_at < $2
        AND t.deleted_at IS NULL
        GROUP BY p.id, p.name
        ORDER BY qty_terjual DESC, p.id ASC
        LIMIT 1
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_optional(pool)
    .await?;

    Ok(SalesReport {
        total_revenue,
        total_transaksi,
        produk_terlaris,
    })
}
