//! # Purchase History Repository
//!
//! Append-only log of purchases.
//!
//! Records are never updated or deleted. `items` is stored as JSON text and
//! handed back exactly as given; this layer does not interpret it.
//!
//! Timestamps are written as RFC 3339 with fixed microsecond precision
//! (`2024-05-01T09:30:00.000000Z`) so that ordering the text column orders by
//! time. Records logged within the same microsecond fall back to insertion
//! order.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbot_core::{PurchaseRecord, Purchaser, DEFAULT_HISTORY_LIMIT};

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    user_id: String,
    user_name: String,
    items: String,
    total_price: f64,
    timestamp: String,
}

impl TryFrom<PurchaseRow> for PurchaseRecord {
    type Error = DbError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(PurchaseRecord {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            items: serde_json::from_str(&row.items)?,
            total_price: row.total_price,
            timestamp: DateTime::parse_from_rfc3339(&row.timestamp)?.with_timezone(&Utc),
        })
    }
}

/// Repository for purchase history.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    /// Creates a new HistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Logs a purchase stamped with the current time.
    ///
    /// ## Returns
    /// The generated record id.
    pub async fn log(
        &self,
        purchaser: &Purchaser,
        items: &serde_json::Value,
        total_price: f64,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        debug!(
            id = %id,
            user_id = %purchaser.id,
            total_price,
            "Logging purchase"
        );

        sqlx::query(
            r#"
            INSERT INTO purchase_history (
                id, user_id, user_name, items, total_price, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&purchaser.id)
        .bind(&purchaser.name)
        .bind(serde_json::to_string(items)?)
        .bind(total_price)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Returns the most recent purchases, newest first.
    ///
    /// ## Arguments
    /// * `limit` - maximum records; `None` means [`DEFAULT_HISTORY_LIMIT`],
    ///   `Some(0)` means no limit
    pub async fn recent(&self, limit: Option<u32>) -> DbResult<Vec<PurchaseRecord>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = match limit.unwrap_or(DEFAULT_HISTORY_LIMIT) {
            0 => -1,
            n => i64::from(n),
        };

        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, user_id, user_name, items, total_price, timestamp
            FROM purchase_history
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PurchaseRecord::try_from).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    async fn test_repo() -> HistoryRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .history()
    }

    #[tokio::test]
    async fn test_log_and_read_back() {
        let repo = test_repo().await;
        let buyer = Purchaser::new("42", "alice#0001");
        let items = json!([{ "name": "Sword", "price": 100, "qty": 2 }]);

        let id = repo.log(&buyer, &items, 200.0).await.unwrap();

        let records = repo.recent(None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].user_id, "42");
        assert_eq!(records[0].user_name, "alice#0001");
        assert_eq!(records[0].items, items);
        assert_eq!(records[0].total_price, 200.0);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        let repo = test_repo().await;
        let buyer = Purchaser::new("1", "bob");

        let mut ids = Vec::new();
        for n in 0..5 {
            let id = repo
                .log(&buyer, &json!({ "order": n }), f64::from(n))
                .await
                .unwrap();
            ids.push(id);
        }

        let records = repo.recent(Some(3)).await.unwrap();
        let got: Vec<String> = records.into_iter().map(|r| r.id).collect();
        assert_eq!(got, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
    }

    #[tokio::test]
    async fn test_default_limit() {
        let repo = test_repo().await;
        let buyer = Purchaser::new("1", "bob");

        for n in 0..7 {
            repo.log(&buyer, &json!([]), f64::from(n)).await.unwrap();
        }

        assert_eq!(
            repo.recent(None).await.unwrap().len(),
            DEFAULT_HISTORY_LIMIT as usize
        );
        assert_eq!(repo.recent(Some(50)).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_zero_limit_returns_everything() {
        let repo = test_repo().await;
        let buyer = Purchaser::new("1", "bob");

        for n in 0..8 {
            repo.log(&buyer, &json!([]), f64::from(n)).await.unwrap();
        }

        let records = repo.recent(Some(0)).await.unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records[0].total_price, 7.0);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let repo = test_repo().await;
        assert!(repo.recent(Some(3)).await.unwrap().is_empty());
    }
}
