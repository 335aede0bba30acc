//! `data_source_health` persistence (spec §6.3, §4.2 `/data-source/health`).

use quotron_core::SourceHealth;
use sqlx::PgPool;

use crate::error::StoreError;

pub async fn upsert_source_health(pool: &PgPool, health: &SourceHealth) -> Result<(), StoreError> {
    let metadata = serde_json::to_value(&health.metadata).unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO data_source_health
            (source_type, source_name, status, last_check, last_success,
             error_count, error_message, response_time_ms, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (source_type, source_name) DO UPDATE SET
            status = EXCLUDED.status,
            last_check = EXCLUDED.last_check,
            last_success = EXCLUDED.last_success,
            error_count = EXCLUDED.error_count,
            error_message = EXCLUDED.error_message,
            response_time_ms = EXCLUDED.response_time_ms,
            metadata = EXCLUDED.metadata
        "#,
    )
    .bind(health.source_type.to_string())
    .bind(&health.source_name)
    .bind(health.status.to_string())
    .bind(health.last_check)
    .bind(health.last_success)
    .bind(health.error_count as i64)
    .bind(&health.error_message)
    .bind(health.response_time_ms.map(|v| v as i64))
    .bind(metadata)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_source_health(pool: &PgPool) -> Result<Vec<SourceHealth>, StoreError> {
    let rows = sqlx::query_as::<_, HealthRow>(
        r#"
        SELECT source_type, source_name, status, last_check, last_success,
               error_count, error_message, response_time_ms, metadata
        FROM data_source_health
        ORDER BY source_type, source_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(|r| r.into_health()).collect())
}

#[derive(sqlx::FromRow)]
struct HealthRow {
    source_type: String,
    source_name: String,
    status: String,
    last_check: chrono::DateTime<chrono::Utc>,
    last_success: Option<chrono::DateTime<chrono::Utc>>,
    error_count: i64,
    error_message: Option<String>,
    response_time_ms: Option<i64>,
    metadata: serde_json::Value,
}

impl HealthRow {
    fn into_health(self) -> Option<SourceHealth> {
        use quotron_core::{HealthStatus, SourceType};

        let source_type = match self.source_type.as_str() {
            "primary" => SourceType::Primary,
            "secondary" => SourceType::Secondary,
            _ => return None,
        };
        let status = match self.status.as_str() {
            "healthy" => HealthStatus::Healthy,
            "degraded" => HealthStatus::Degraded,
            "unhealthy" => HealthStatus::Unhealthy,
            "unknown" => HealthStatus::Unknown,
            _ => return None,
        };
        let metadata = serde_json::from_value(self.metadata).unwrap_or_default();

        Some(SourceHealth {
            source_type,
            source_name: self.source_name,
            status,
            last_check: self.last_check,
            last_success: self.last_success,
            error_count: self.error_count as u64,
            error_message: self.error_message,
            response_time_ms: self.response_time_ms.map(|v| v as u64),
            metadata,
        })
    }
}
