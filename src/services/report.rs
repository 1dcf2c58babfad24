use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;

use crate::db::models::SalesReport;
use crate::db::queries;
use crate::error::AppError;

/// Read-only revenue summaries over whole local days.
#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn daily(&self) -> Result<SalesReport, AppError> {
        let today = self.store_today().await;
        self.by_date_range(today, today).await
    }

    /// Covers every sale from `start` 00:00 up to the end of `end`, both
    /// local days included. An inverted range simply matches nothing.
    pub async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<SalesReport, AppError> {
        let (from, to) = day_bounds(start, end);
        let report = queries::sales_report(&self.pool, from, to).await?;
        Ok(report)
    }

    // The store's session timezone decides what "today" is, not the host clock.
    async fn store_today(&self) -> NaiveDate {
        sqlx::query_scalar::<_, NaiveDate>("SELECT CURRENT_DATE")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to host date for daily report");
                Local::now().date_naive()
            })
    }
}

/// Half-open `[start 00:00, day after end 00:00)`.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let after_end = end.succ_opt().unwrap_or(end);
    (start.and_time(NaiveTime::MIN), after_end.and_time(NaiveTime::MIN))
}

pub fn parse_report_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{} must be a date in YYYY-MM-DD format", field)))
}
