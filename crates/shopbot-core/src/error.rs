//! # Error Types
//!
//! Domain-specific error types for shopbot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopbot-core errors (this file)                                       │
//! │  ├── CoreError        - Registry rule violations                       │
//! │  └── ValidationError  - Missing required fields                        │
//! │                                                                         │
//! │  shopbot-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → bot layer message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// Each variant carries the offending code so the bot layer can echo it back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The code is already a registered country, or is the canonical target
    /// of a legacy alias in `country_codes`.
    #[error("Country with code {0} already exists")]
    CountryExists(String),

    /// The code is neither in `countries` nor in `country_names`.
    #[error("Country with code {0} not found")]
    CountryNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary, before anything reaches the database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is not a finite number.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
