//! # Repository Module
//!
//! Database repository implementations for the shop catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Bot command handler                                                   │
//! │       │                                                                 │
//! │       │  db.products().load(Some("jp"), Some("weapon"))                │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── load / count                                                      │
//! │  ├── save / batch_add / add_placeholders                               │
//! │  ├── update / remove                                                   │
//! │  └── clear_category / delete_by_country / delete_all                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories hold a pool clone and no other state, so they are       │
//! │  created on demand from `Database` and dropped after use.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CountryRepository`](country::CountryRepository) - Country registry document
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`HistoryRepository`](history::HistoryRepository) - Append-only purchase log
//! - [`SettingsRepository`](settings::SettingsRepository) - QR code URL and thank-you message

pub mod country;
pub mod history;
pub mod product;
pub mod settings;
