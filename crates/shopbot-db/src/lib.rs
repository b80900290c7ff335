//! # shopbot-db: Database Layer for the Shop Catalog
//!
//! Persistence for the shop bot's country registry, product catalog,
//! purchase history and configuration entries. SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopbot Data Flow                                │
//! │                                                                         │
//! │  Bot command (/buy, /addproduct, /setqr ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shopbot-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ CountryRepo    │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 001_initial  │   │   │
//! │  │   │ StoreConfig   │    │ HistoryRepo    │   │              │   │   │
//! │  │   │               │    │ SettingsRepo   │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   SHOPBOT_DB_PATH (default ./shopbot.db)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded bootstrap schema
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopbot_db::{Database, StoreConfig};
//!
//! let config = StoreConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! db.countries().add("jp", "Japan", Some("🇯🇵")).await?;
//! let swords = db.products().load(Some("jp"), Some("weapon")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::country::CountryRepository;
pub use repository::history::HistoryRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::{SettingDefaults, SettingsRepository};
