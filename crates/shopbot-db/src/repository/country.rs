//! # Country Repository
//!
//! Persistence for the single [`CountryRegistry`] aggregate.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every registry change                                │
//! │                                                                         │
//! │  load()  ──► CountryRegistry (in memory)                               │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  registry.add / edit / remove   (pure rules in shopbot-core)           │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  save()  ──► INSERT ... ON CONFLICT(id) DO UPDATE (whole document)     │
//! │                                                                         │
//! │  Two concurrent callers can both pass the rule check before either     │
//! │  writes; the later save wins.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Country Removal Saga
//! `remove` is two independent statements:
//! 1. save the registry without the country
//! 2. delete every product of that country
//!
//! If step 2 fails the country is already gone from the registry and its
//! products remain as orphans; the error is returned to the caller, who may
//! retry with [`ProductRepository::delete_by_country`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use shopbot_core::CountryRegistry;

/// Primary key of the single registry row.
const REGISTRY_ID: &str = "countries";

#[derive(sqlx::FromRow)]
struct RegistryRow {
    countries: String,
    country_names: String,
    country_emojis: String,
    country_codes: String,
}

impl TryFrom<RegistryRow> for CountryRegistry {
    type Error = serde_json::Error;

    fn try_from(row: RegistryRow) -> Result<Self, Self::Error> {
        Ok(CountryRegistry {
            countries: serde_json::from_str(&row.countries)?,
            country_names: serde_json::from_str(&row.country_names)?,
            country_emojis: serde_json::from_str(&row.country_emojis)?,
            country_codes: serde_json::from_str(&row.country_codes)?,
        })
    }
}

/// Repository for the country registry.
#[derive(Debug, Clone)]
pub struct CountryRepository {
    pool: SqlitePool,
}

impl CountryRepository {
    /// Creates a new CountryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CountryRepository { pool }
    }

    /// Loads the registry.
    ///
    /// ## Returns
    /// * `Ok(CountryRegistry)` - stored registry, or an empty one when nothing
    ///   has been saved yet
    pub async fn load(&self) -> DbResult<CountryRegistry> {
        let row = sqlx::query_as::<_, RegistryRow>(
            r#"
            SELECT countries, country_names, country_emojis, country_codes
            FROM country_registry
            WHERE id = ?1
            "#,
        )
        .bind(REGISTRY_ID)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(CountryRegistry::try_from(row)?),
            None => {
                debug!("No country registry stored yet");
                Ok(CountryRegistry::default())
            }
        }
    }

    /// Writes the whole registry, replacing what was stored.
    ///
    /// Saving the same registry twice leaves the same stored state.
    pub async fn save(&self, registry: &CountryRegistry) -> DbResult<()> {
        debug!(countries = registry.countries.len(), "Saving country registry");

        let countries = serde_json::to_string(&registry.countries)?;
        let names = serde_json::to_string(&registry.country_names)?;
        let emojis = serde_json::to_string(&registry.country_emojis)?;
        let codes = serde_json::to_string(&registry.country_codes)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO country_registry (
                id, countries, country_names, country_emojis, country_codes, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                countries = excluded.countries,
                country_names = excluded.country_names,
                country_emojis = excluded.country_emojis,
                country_codes = excluded.country_codes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(REGISTRY_ID)
        .bind(countries)
        .bind(names)
        .bind(emojis)
        .bind(codes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds a country.
    ///
    /// ## Returns
    /// * `Ok(())` - country added and registry saved
    /// * `Err(DbError::UniqueViolation)` - code already registered, or the
    ///   target of a legacy alias; nothing is written
    /// * `Err(DbError::InvalidInput)` - empty code or name
    pub async fn add(&self, code: &str, name: &str, emoji: Option<&str>) -> DbResult<()> {
        let mut registry = self.load().await?;

        if let Err(e) = registry.add(code, name, emoji) {
            warn!(code = %code, error = %e, "Rejected country add");
            return Err(e.into());
        }

        self.save(&registry).await?;
        info!(code = %code, "Country added");
        Ok(())
    }

    /// Edits a country's name and/or emoji. Empty values are ignored.
    ///
    /// ## Returns
    /// * `Ok(true)` - country found and saved
    /// * `Ok(false)` - unknown country; nothing is written
    pub async fn edit(
        &self,
        code: &str,
        new_name: Option<&str>,
        new_emoji: Option<&str>,
    ) -> DbResult<bool> {
        let mut registry = self.load().await?;

        if !registry.edit(code, new_name, new_emoji) {
            debug!(code = %code, "Country to edit not found");
            return Ok(false);
        }

        self.save(&registry).await?;
        Ok(true)
    }

    /// Removes a country and every product sold in it.
    ///
    /// See the module docs for the two-step failure behaviour.
    ///
    /// ## Returns
    /// * `Ok(n)` - country removed; `n` products were deleted with it
    /// * `Err(DbError::NotFound)` - unknown country; nothing is written
    pub async fn remove(&self, code: &str) -> DbResult<u64> {
        let mut registry = self.load().await?;

        if let Err(e) = registry.remove(code) {
            warn!(code = %code, error = %e, "Rejected country removal");
            return Err(e.into());
        }

        self.save(&registry).await?;

        let products = ProductRepository::new(self.pool.clone());
        let deleted = products.delete_by_country(code).await.inspect_err(|e| {
            warn!(
                code = %code,
                error = %e,
                "Country removed from registry but its products were not deleted"
            );
        })?;

        info!(code = %code, products_deleted = deleted, "Country removed");
        Ok(deleted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
