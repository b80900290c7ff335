//! # shopbot-core: Pure Domain Model for the Shopbot Catalog
//!
//! This crate holds the record types and rules of the shop catalog as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shopbot Catalog Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Bot / command layer (external)                 │   │
//! │  │   /addcountry, /addproduct, /buy, /history, /setqr ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ shopbot-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐  ┌─────────────┐  ┌─────────────┐             │   │
//! │  │   │    types    │  │ validation  │  │    error    │             │   │
//! │  │   │  Registry   │  │  drafts     │  │  CoreError  │             │   │
//! │  │   │  Product    │  │  codes      │  │  Validation │             │   │
//! │  │   └─────────────┘  └─────────────┘  └─────────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  shopbot-db (Database Layer)                    │   │
//! │  │          SQLite queries, bootstrap schema, repositories         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record types (CountryRegistry, Product, PurchaseRecord, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Required-field checks at the input boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use shopbot_core::types::CountryRegistry;
//!
//! let mut registry = CountryRegistry::default();
//! registry.add("jp", "Japan", Some("🇯🇵")).unwrap();
//!
//! assert!(registry.add("jp", "Japan again", None).is_err());
//! assert_eq!(registry.display_name("jp"), Some("Japan"));
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use types::*;

/// Name given to placeholder products.
pub const PLACEHOLDER_NAME: &str = "no product";

/// Emoji shown on placeholder products.
pub const PLACEHOLDER_EMOJI: &str = "❌";

/// Number of purchase records returned when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 5;

/// QR code URL returned before one has been saved.
pub const DEFAULT_QRCODE_URL: &str = "https://promptpay.io/1234567890";

/// Thank-you message returned before one has been saved.
pub const DEFAULT_THANK_YOU_MESSAGE: &str =
    "✅ Thank you for your order! Your items will be delivered shortly.";
