//! # Domain Types
//!
//! Record types used throughout the shop catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CountryRegistry │   │     Product     │   │ PurchaseRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  countries      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  country_names  │   │  name           │   │  user_id        │       │
//! │  │  country_emojis │   │  price          │   │  items (JSON)   │       │
//! │  │  country_codes  │   │  country        │   │  total_price    │       │
//! │  └─────────────────┘   │  category       │   │  timestamp      │       │
//! │   one aggregate        └─────────────────┘   └─────────────────┘       │
//! │                                                  append-only            │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  ProductDraft   │──►│   NewProduct    │   (validated boundary)      │
//! │  │  all Option<_>  │   │  all required   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products have:
//! - `id`: UUID v4 - immutable, kept across upserts
//! - Business key: (name, country, category) - the upsert key

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{PLACEHOLDER_EMOJI, PLACEHOLDER_NAME};

// =============================================================================
// Country Registry
// =============================================================================

/// The single aggregate record describing every country the shop sells in.
///
/// Always read and written as a whole. The rule methods below mutate the
/// in-memory copy only; persisting it is the repository's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountryRegistry {
    /// Country codes in display order.
    pub countries: Vec<String>,

    /// Code → display name.
    pub country_names: BTreeMap<String, String>,

    /// Code → emoji. Not every code has one.
    pub country_emojis: BTreeMap<String, String>,

    /// Legacy or alternate code → canonical code.
    pub country_codes: BTreeMap<String, String>,
}

impl CountryRegistry {
    /// Returns true when `code` is listed in `countries` or has a name.
    pub fn contains(&self, code: &str) -> bool {
        self.countries.iter().any(|c| c == code) || self.country_names.contains_key(code)
    }

    /// Returns true when `code` cannot be added again.
    ///
    /// A code is taken when it is listed in `countries` or when it is the
    /// canonical target of a legacy alias.
    pub fn is_taken(&self, code: &str) -> bool {
        self.countries.iter().any(|c| c == code) || self.country_codes.values().any(|c| c == code)
    }

    /// Appends a new country.
    ///
    /// The emoji is only recorded when it is non-empty.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - empty code or name
    /// * `CoreError::CountryExists` - see [`CountryRegistry::is_taken`]
    pub fn add(&mut self, code: &str, name: &str, emoji: Option<&str>) -> CoreResult<()> {
        if code.trim().is_empty() {
            return Err(ValidationError::required("code").into());
        }
        if name.trim().is_empty() {
            return Err(ValidationError::required("name").into());
        }
        if self.is_taken(code) {
            return Err(CoreError::CountryExists(code.to_string()));
        }

        self.countries.push(code.to_string());
        self.country_names.insert(code.to_string(), name.to_string());
        if let Some(emoji) = emoji.filter(|e| !e.is_empty()) {
            self.country_emojis.insert(code.to_string(), emoji.to_string());
        }

        Ok(())
    }

    /// Applies the provided non-empty fields to an existing country.
    ///
    /// Returns false when the country is unknown.
    pub fn edit(&mut self, code: &str, new_name: Option<&str>, new_emoji: Option<&str>) -> bool {
        if !self.contains(code) {
            return false;
        }

        if let Some(name) = new_name.filter(|n| !n.is_empty()) {
            self.country_names.insert(code.to_string(), name.to_string());
        }
        if let Some(emoji) = new_emoji.filter(|e| !e.is_empty()) {
            self.country_emojis.insert(code.to_string(), emoji.to_string());
        }

        true
    }

    /// Removes a country from all four structures, including every legacy
    /// alias that points at it.
    pub fn remove(&mut self, code: &str) -> CoreResult<()> {
        if !self.contains(code) {
            return Err(CoreError::CountryNotFound(code.to_string()));
        }

        self.countries.retain(|c| c != code);
        self.country_names.remove(code);
        self.country_emojis.remove(code);
        self.country_codes.retain(|_, canonical| canonical != code);

        Ok(())
    }

    /// Display name for a code, if one is recorded.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.country_names.get(code).map(String::as_str)
    }

    /// Emoji for a code, if one is recorded.
    pub fn emoji(&self, code: &str) -> Option<&str> {
        self.country_emojis.get(code).map(String::as_str)
    }

    /// Maps a legacy code to its canonical code. Unknown codes map to themselves.
    pub fn canonical_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.country_codes.get(code).map_or(code, String::as_str)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stored catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Part of the upsert key.
    pub name: String,

    /// Unit price in the shop's currency.
    pub price: f64,

    /// Emoji shown next to the name.
    pub emoji: String,

    /// Country code. Part of the upsert key.
    pub country: String,

    /// Category code. Part of the upsert key.
    pub category: String,

    /// When the product was first stored.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last written.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true for the synthetic "no product" entries.
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_NAME && self.emoji == PLACEHOLDER_EMOJI
    }
}

/// Loosely-typed product input, as received from the bot layer.
///
/// Every field is optional so that partially filled JSON deserializes;
/// [`crate::validation::validate_product_draft`] turns it into a
/// [`NewProduct`] or reports the first missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub emoji: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
}

/// A validated product ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub emoji: String,
    pub country: String,
    pub category: String,
}

impl NewProduct {
    /// Builds the placeholder shown for an empty (country, category) pair.
    pub fn placeholder(country: &str, category: &str) -> Self {
        NewProduct {
            name: PLACEHOLDER_NAME.to_string(),
            price: 0.0,
            emoji: PLACEHOLDER_EMOJI.to_string(),
            country: country.to_string(),
            category: category.to_string(),
        }
    }
}

/// Partial update for a product.
///
/// `None` means "leave unchanged". Empty strings are treated the same way;
/// a price of zero is a real change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductChanges {
    pub emoji: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub country: Option<String>,
}

impl ProductChanges {
    /// Drops empty strings so that only real changes remain.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        ProductChanges {
            emoji: keep(self.emoji),
            name: keep(self.name),
            price: self.price,
            category: keep(self.category),
            country: keep(self.country),
        }
    }

    /// Returns true when nothing would be written.
    pub fn is_empty(&self) -> bool {
        let normalized = self.clone().normalized();
        normalized.emoji.is_none()
            && normalized.name.is_none()
            && normalized.price.is_none()
            && normalized.category.is_none()
            && normalized.country.is_none()
    }
}

// =============================================================================
// Purchase History
// =============================================================================

/// Who made a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchaser {
    pub id: String,
    pub name: String,
}

impl Purchaser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Purchaser {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One logged purchase. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Line items exactly as the caller passed them.
    #[ts(type = "unknown")]
    pub items: serde_json::Value,
    pub total_price: f64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Configuration Entries
// =============================================================================

/// Discriminator of a singleton configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    /// Payment QR code URL.
    #[serde(rename = "qrcode")]
    QrCode,
    /// Message sent after a completed order.
    ThankYou,
}

impl ConfigKind {
    /// Value stored in the `config_type` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::QrCode => "qrcode",
            ConfigKind::ThankYou => "thank_you",
        }
    }

    /// Name of the payload field that belongs to this kind.
    pub const fn payload_field(&self) -> &'static str {
        match self {
            ConfigKind::QrCode => "url",
            ConfigKind::ThankYou => "message",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
