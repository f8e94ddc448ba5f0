//! Relational session store.
//!
//! Expected layout (one row per verification call):
//!
//! ```sql
//! CREATE TABLE sessions (
//!     id                        BIGSERIAL PRIMARY KEY,
//!     external_database_ref_id  TEXT NOT NULL,
//!     path                      TEXT,
//!     success                   BOOLEAN,
//!     call_date                 TIMESTAMPTZ,
//!     result                    JSONB,
//!     additional_session_data   JSONB,
//!     age_estimation            JSONB,
//!     id_scan_results_so_far    JSONB,
//!     data                      JSONB
//! );
//! CREATE INDEX sessions_external_ref_idx ON sessions (external_database_ref_id);
//! ```

use crate::models::{CallData, HttpCallInfo, SessionItem};
use crate::services::store::SessionStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, FromRow)]
struct SessionRow {
    external_database_ref_id: String,
    path: Option<String>,
    success: Option<bool>,
    call_date: Option<DateTime<Utc>>,
    result: Option<Value>,
    additional_session_data: Option<Value>,
    age_estimation: Option<Value>,
    id_scan_results_so_far: Option<Value>,
    data: Option<Value>,
}

impl From<SessionRow> for SessionItem {
    fn from(row: SessionRow) -> Self {
        SessionItem {
            http_call_info: Some(HttpCallInfo { path: row.path }),
            external_database_ref_id: Some(row.external_database_ref_id),
            result: row.result,
            call_data: row.call_date.map(|date| CallData {
                date: Some(Value::String(
                    date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                )),
            }),
            additional_session_data: row.additional_session_data,
            age_estimation: row.age_estimation,
            id_scan_results_so_far: row.id_scan_results_so_far,
            data: row.data,
            success: row.success,
        }
    }
}

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
    select_by_reference: String,
}

impl PostgresSessionStore {
    #[instrument(skip(database_url))]
    pub async fn new(database_url: &str, table: &str, max_connections: u32) -> Result<Self, AppError> {
        validate_table_name(table)?;

        info!(max_connections = max_connections, "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self::with_pool(pool, table))
    }

    fn with_pool(pool: PgPool, table: &str) -> Self {
        let select_by_reference = format!(
            "SELECT external_database_ref_id, path, success, call_date, result, \
             additional_session_data, age_estimation, id_scan_results_so_far, data \
             FROM {} WHERE external_database_ref_id = $1 ORDER BY id ASC",
            table
        );
        Self {
            pool,
            select_by_reference,
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    #[instrument(skip(self))]
    async fn find_by_reference(&self, reference: &str) -> Result<Vec<SessionItem>, AppError> {
        let rows = sqlx::query_as::<_, SessionRow>(&self.select_by_reference)
            .bind(reference)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to fetch sessions: {}", e))
            })?;

        Ok(rows.into_iter().map(SessionItem::from).collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// The table name is spliced into SQL, so only plain (optionally schema-qualified)
/// identifiers are accepted.
fn validate_table_name(table: &str) -> Result<(), AppError> {
    let valid = !table.is_empty()
        && table.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "Invalid table name: {}",
            table
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionPath;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn accepts_plain_and_qualified_table_names() {
        assert!(validate_table_name("sessions").is_ok());
        assert!(validate_table_name("verification.sessions_v2").is_ok());
    }

    #[test]
    fn rejects_injected_table_names() {
        assert!(validate_table_name("sessions; DROP TABLE sessions").is_err());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1sessions").is_err());
        assert!(validate_table_name("a..b").is_err());
    }

    #[test]
    fn row_maps_to_session_item() {
        let row = SessionRow {
            external_database_ref_id: "abc123".to_string(),
            path: Some("/enrollment-3d".to_string()),
            success: Some(true),
            call_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            result: Some(json!({ "auditTrailImage": "img.png" })),
            additional_session_data: None,
            age_estimation: None,
            id_scan_results_so_far: None,
            data: None,
        };

        let item = SessionItem::from(row);
        assert_eq!(item.path(), SessionPath::Enrollment3d);
        assert_eq!(item.date(), Some(json!("2024-01-01T00:00:00Z")));
        assert_eq!(item.audit_trail_image(), "img.png");
        assert_eq!(item.success, Some(true));
    }
}
