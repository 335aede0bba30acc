//! Market index persistence — `market_indices` table (spec §6.3).

use quotron_core::MarketIndex;
use sqlx::PgPool;

use crate::error::StoreError;

/// Idempotent on `(index_name, timestamp, source)` — a duplicate insert from
/// bus at-least-once redelivery (spec §8) is a silent no-op rather than
/// a second row.
pub async fn insert_index(pool: &PgPool, index: &MarketIndex) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO market_indices
            (index_name, value, change, change_percent, timestamp, source)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (index_name, timestamp, source) DO NOTHING
        "#,
    )
    .bind(&index.name)
    .bind(index.value)
    .bind(index.change)
    .bind(index.change_percent)
    .bind(index.timestamp)
    .bind(index.source.to_string())
    .execute(pool)
    .await?;
    Ok(())
}
