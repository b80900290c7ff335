//! # Settings Repository
//!
//! Keyed singleton configuration entries.
//!
//! ```text
//! configs
//! ┌──────────────┬───────────────────────────────┬──────────────────────┐
//! │ config_type  │ url                           │ message              │
//! ├──────────────┼───────────────────────────────┼──────────────────────┤
//! │ qrcode       │ https://promptpay.io/...      │ NULL                 │
//! │ thank_you    │ NULL                          │ ✅ Thank you ...     │
//! └──────────────┴───────────────────────────────┴──────────────────────┘
//!   UNIQUE(config_type): a save overwrites, never duplicates
//! ```
//!
//! Reads fall back to [`SettingDefaults`] when no entry exists.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use shopbot_core::{ConfigKind, DEFAULT_QRCODE_URL, DEFAULT_THANK_YOU_MESSAGE};

/// Values returned before an entry has been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDefaults {
    pub qrcode_url: String,
    pub thank_you_message: String,
}

impl Default for SettingDefaults {
    fn default() -> Self {
        SettingDefaults {
            qrcode_url: DEFAULT_QRCODE_URL.to_string(),
            thank_you_message: DEFAULT_THANK_YOU_MESSAGE.to_string(),
        }
    }
}

impl SettingDefaults {
    fn for_kind(&self, kind: ConfigKind) -> &str {
        match kind {
            ConfigKind::QrCode => &self.qrcode_url,
            ConfigKind::ThankYou => &self.thank_you_message,
        }
    }
}

/// Repository for configuration entries.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    defaults: SettingDefaults,
}

impl SettingsRepository {
    /// Creates a SettingsRepository with the built-in defaults.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_defaults(pool, SettingDefaults::default())
    }

    /// Creates a SettingsRepository with custom defaults.
    pub fn with_defaults(pool: SqlitePool, defaults: SettingDefaults) -> Self {
        SettingsRepository { pool, defaults }
    }

    /// Payment QR code URL.
    pub async fn qrcode_url(&self) -> DbResult<String> {
        self.load(ConfigKind::QrCode).await
    }

    /// Stores the payment QR code URL.
    pub async fn save_qrcode_url(&self, url: &str) -> DbResult<()> {
        self.save(ConfigKind::QrCode, url).await
    }

    /// Message sent after an order.
    pub async fn thank_you_message(&self) -> DbResult<String> {
        self.load(ConfigKind::ThankYou).await
    }

    /// Stores the message sent after an order.
    pub async fn save_thank_you_message(&self, message: &str) -> DbResult<()> {
        self.save(ConfigKind::ThankYou, message).await
    }

    /// Reads an entry's payload, or the default when the entry or its
    /// payload is missing.
    pub async fn load(&self, kind: ConfigKind) -> DbResult<String> {
        let value: Option<Option<String>> = sqlx::query_scalar(&format!(
            "SELECT {} FROM configs WHERE config_type = ?1",
            kind.payload_field()
        ))
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match value.flatten() {
            Some(value) => Ok(value),
            None => {
                debug!(config_type = kind.as_str(), "Using default setting");
                Ok(self.defaults.for_kind(kind).to_string())
            }
        }
    }

    /// Creates or overwrites an entry's payload.
    pub async fn save(&self, kind: ConfigKind, value: &str) -> DbResult<()> {
        let column = kind.payload_field();

        sqlx::query(&format!(
            r#"
            INSERT INTO configs (id, config_type, {column}, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(config_type) DO UPDATE SET
                {column} = excluded.{column},
                updated_at = excluded.updated_at
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(kind.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(config_type = kind.as_str(), "Setting saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn config_rows(db: &Database, kind: ConfigKind) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM configs WHERE config_type = ?1")
            .bind(kind.as_str())
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_qrcode_default_then_saved() {
        let db = test_db().await;
        let settings = db.settings();

        assert_eq!(settings.qrcode_url().await.unwrap(), DEFAULT_QRCODE_URL);

        settings.save_qrcode_url("https://x").await.unwrap();
        assert_eq!(settings.qrcode_url().await.unwrap(), "https://x");

        settings.save_qrcode_url("https://y").await.unwrap();
        assert_eq!(settings.qrcode_url().await.unwrap(), "https://y");
        assert_eq!(config_rows(&db, ConfigKind::QrCode).await, 1);
    }

    #[tokio::test]
    async fn test_thank_you_default_then_saved() {
        let db = test_db().await;
        let settings = db.settings();

        assert_eq!(
            settings.thank_you_message().await.unwrap(),
            DEFAULT_THANK_YOU_MESSAGE
        );

        settings.save_thank_you_message("Thanks!").await.unwrap();
        settings.save_thank_you_message("Thanks again!").await.unwrap();

        assert_eq!(settings.thank_you_message().await.unwrap(), "Thanks again!");
        assert_eq!(config_rows(&db, ConfigKind::ThankYou).await, 1);
    }

    #[tokio::test]
    async fn test_entries_are_independent() {
        let db = test_db().await;
        let settings = db.settings();

        settings.save_qrcode_url("https://pay.example/qr").await.unwrap();

        assert_eq!(
            settings.thank_you_message().await.unwrap(),
            DEFAULT_THANK_YOU_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_custom_defaults() {
        let defaults = SettingDefaults {
            qrcode_url: "https://promptpay.io/0000".to_string(),
            thank_you_message: "ขอบคุณ".to_string(),
        };
        let db = Database::new(DbConfig::in_memory().setting_defaults(defaults))
            .await
            .unwrap();

        assert_eq!(
            db.settings().qrcode_url().await.unwrap(),
            "https://promptpay.io/0000"
        );
        assert_eq!(db.settings().thank_you_message().await.unwrap(), "ขอบคุณ");
    }
}
