use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Timestamps are stored without a zone and read back in the session
/// timezone, so they are rendered as plain local wall-clock values.
pub mod local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveDateTime::parse_from_str(&raw, FORMAT))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(with = "local_timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub category_id: Option<i32>,
    #[serde(with = "local_timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
}

/// Current name, price and stock of a product as seen inside a checkout.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StockSnapshot {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

/// A committed sale. Immutable once created apart from `deleted_at`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub total_amount: i64,
    #[serde(with = "local_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "local_timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    #[sqlx(skip)]
    pub details: Vec<TransactionDetail>,
}

/// Line item snapshot: name and subtotal are fixed at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_revenue: i64,
    pub total_transaksi: i64,
    pub produk_terlaris: Option<TopProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TopProduct {
    pub nama: String,
    pub qty_terjual: i64,
}
