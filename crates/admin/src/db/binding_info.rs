//! Saved binding labels.
//!
//! The whole `BindingsSaved` array is one JSONB value under the
//! `binding_info` settings key. Reads return it as stored; writes replace it.

use async_trait::async_trait;
use binding_selector_core::BindingsSaved;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// Settings key holding the saved array.
const BINDING_INFO_KEY: &str = "binding_info";

/// Persistence of the saved binding labels.
#[async_trait]
pub trait BindingInfoStore: Send + Sync {
    /// Every saved record, empty when nothing was saved yet.
    async fn read(&self) -> Result<Vec<BindingsSaved>, RepositoryError>;

    /// Replace every saved record.
    async fn write(&self, records: &[BindingsSaved]) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`BindingInfoStore`].
#[derive(Clone)]
pub struct PgBindingInfoStore {
    pool: PgPool,
}

impl PgBindingInfoStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BindingInfoStore for PgBindingInfoStore {
    async fn read(&self) -> Result<Vec<BindingsSaved>, RepositoryError> {
        let value: Option<JsonValue> =
            sqlx::query_scalar("SELECT value FROM admin.settings WHERE key = $1")
                .bind(BINDING_INFO_KEY)
                .fetch_optional(&self.pool)
                .await?;

        value.map_or_else(|| Ok(Vec::new()), decode_records)
    }

    async fn write(&self, records: &[BindingsSaved]) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(records)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO admin.settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(BINDING_INFO_KEY)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Decode the stored JSON array.
fn decode_records(value: JsonValue) -> Result<Vec<BindingsSaved>, RepositoryError> {
    serde_json::from_value(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {BINDING_INFO_KEY} value: {e}"))
    })
}
