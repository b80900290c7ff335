//! # Validation Module
//!
//! Required-field checks for catalog input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Bot command parsing (external)                               │
//! │  └── Splits user text into fields                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── ProductDraft → NewProduct (every field present)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE (name, country, category)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only presence is checked. Prices may be zero or negative; names may be
//! anything non-empty.

use crate::error::ValidationError;
use crate::types::{NewProduct, ProductDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fields a product must carry, in the order they are checked.
pub const REQUIRED_PRODUCT_FIELDS: [&str; 5] = ["name", "price", "emoji", "country", "category"];

/// Validates a product draft.
///
/// ## Rules
/// - name, price, emoji, country and category must all be present
/// - string fields must not be empty
/// - price must be a finite number
///
/// ## Example
/// ```rust
/// use shopbot_core::types::ProductDraft;
/// use shopbot_core::validation::validate_product_draft;
///
/// let draft = ProductDraft {
///     name: Some("Gold".into()),
///     price: Some(50.0),
///     emoji: Some("💰".into()),
///     country: Some("jp".into()),
///     category: Some("money".into()),
/// };
/// assert!(validate_product_draft(&draft).is_ok());
/// assert!(validate_product_draft(&ProductDraft::default()).is_err());
/// ```
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<NewProduct> {
    let name = required_text(REQUIRED_PRODUCT_FIELDS[0], draft.name.as_deref())?;
    let price = draft
        .price
        .ok_or_else(|| ValidationError::required(REQUIRED_PRODUCT_FIELDS[1]))?;
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: REQUIRED_PRODUCT_FIELDS[1].to_string(),
        });
    }
    let emoji = required_text(REQUIRED_PRODUCT_FIELDS[2], draft.emoji.as_deref())?;
    let country = required_text(REQUIRED_PRODUCT_FIELDS[3], draft.country.as_deref())?;
    let category = required_text(REQUIRED_PRODUCT_FIELDS[4], draft.category.as_deref())?;

    Ok(NewProduct {
        name,
        price,
        emoji,
        country,
        category,
    })
}

/// Validates a non-empty text field and returns it owned.
pub fn required_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::required(field)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> ProductDraft {
        ProductDraft {
            name: Some("Sword".to_string()),
            price: Some(120.0),
            emoji: Some("🗡️".to_string()),
            country: Some("jp".to_string()),
            category: Some("weapon".to_string()),
        }
    }

    #[test]
    fn test_valid_draft() {
        let product = validate_product_draft(&full_draft()).unwrap();
        assert_eq!(product.name, "Sword");
        assert_eq!(product.price, 120.0);
        assert_eq!(product.category, "weapon");
    }

    #[test]
    fn test_zero_price_is_present() {
        let draft = ProductDraft {
            price: Some(0.0),
            ..full_draft()
        };
        assert!(validate_product_draft(&draft).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let draft = ProductDraft {
            price: None,
            category: None,
            ..full_draft()
        };
        assert_eq!(
            validate_product_draft(&draft).unwrap_err(),
            ValidationError::required("price")
        );

        let draft = ProductDraft {
            emoji: Some("   ".to_string()),
            ..full_draft()
        };
        assert_eq!(
            validate_product_draft(&draft).unwrap_err(),
            ValidationError::required("emoji")
        );
    }

    #[test]
    fn test_non_finite_price() {
        let draft = ProductDraft {
            price: Some(f64::NAN),
            ..full_draft()
        };
        assert!(matches!(
            validate_product_draft(&draft),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("code", Some("jp")).unwrap(), "jp");
        assert!(required_text("code", Some("")).is_err());
        assert!(required_text("code", None).is_err());
    }
}
