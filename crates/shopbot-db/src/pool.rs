//! # Store Handle
//!
//! Opening the SQLite file and handing out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bot Process                                        │
//! │                                                                         │
//! │  StoreConfig::load()  (SHOPBOT_* env)                                  │
//! │       │ db_config()                                                     │
//! │       ▼                                                                 │
//! │  Database::new ── file or :memory: ── pool ── bootstrap schema         │
//! │       │                                                                 │
//! │       │ clone per handler (shares the pool)                             │
//! │       ▼                                                                 │
//! │  ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐           │
//! │  │ countries()│ │ products() │ │ history()  │ │ settings() │           │
//! │  └────────────┘ └────────────┘ └────────────┘ └────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There are no process-wide collection globals: whoever needs the store
//! receives a `Database` value.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::country::CountryRepository;
use crate::repository::history::HistoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::settings::{SettingDefaults, SettingsRepository};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ```rust,ignore
/// let config = DbConfig::new("./shop.db")
///     .max_connections(4)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a private
    /// throwaway database.
    pub database_path: PathBuf,

    /// Pool size upper bound (default 5).
    pub max_connections: u32,

    /// How long a caller waits for a free connection (default 30s).
    pub acquire_timeout: Duration,

    /// How long SQLite retries a locked database before failing (default 5s).
    pub busy_timeout: Duration,

    /// Idle connections are closed after this (default 10 min).
    pub idle_timeout: Duration,

    /// Apply pending schema files when opening (default true).
    pub run_migrations: bool,

    /// Values the settings repository serves until something is saved.
    pub setting_defaults: SettingDefaults,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            setting_defaults: SettingDefaults::default(),
        }
    }

    /// A private database that disappears with its pool. Used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            // every connection to :memory: would otherwise see its own database
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn setting_defaults(mut self, defaults: SettingDefaults) -> Self {
        self.setting_defaults = defaults;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            // sqlx gives each `sqlite::memory:` parse its own named database
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options.busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open store. Clones share one pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./shop.db")).await?;
///
/// db.countries().add("jp", "Japan", Some("🇯🇵")).await?;
/// let weapons = db.products().load(Some("jp"), Some("weapon")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    setting_defaults: SettingDefaults,
}

impl Database {
    /// Opens the store described by `config`, applying the bootstrap schema
    /// unless `run_migrations` is off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let options = config.connect_options()?;
        debug!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening store"
        );

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout));
        if config.is_in_memory() {
            // the database lives only as long as its last connection
            pool_options = pool_options.min_connections(1).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!(path = %config.database_path.display(), error = %e, "Store unavailable");
                DbError::ConnectionFailed(e.to_string())
            })?;

        let db = Database {
            pool,
            setting_defaults: config.setting_defaults,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Store ready"
        );
        Ok(db)
    }

    /// Applies pending schema files. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns `(total_migrations, applied_migrations)`.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Raw pool, for queries outside the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn countries(&self) -> CountryRepository {
        CountryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::with_defaults(self.pool.clone(), self.setting_defaults.clone())
    }

    /// Closes every connection. Repository calls fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Store closed");
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        matches!(
            sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool).await,
            Ok(1)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.migration_status().await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        let second = Database::new(DbConfig::in_memory()).await.unwrap();

        first.countries().add("jp", "Japan", None).await.unwrap();

        assert!(second.countries().load().await.unwrap().countries.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let handler_copy = db.clone();

        handler_copy.countries().add("th", "Thailand", None).await.unwrap();

        assert!(db.countries().load().await.unwrap().contains("th"));
    }

    #[tokio::test]
    async fn test_closed_store_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/shop.db")
            .max_connections(8)
            .busy_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
