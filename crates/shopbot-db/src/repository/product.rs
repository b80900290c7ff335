//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Filtered listing by country and/or category
//! - Upsert by the (name, country, category) key
//! - Partial updates and bulk deletes
//! - "no product" placeholders for empty shelves
//!
//! ## Upsert by Composite Key
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    save(draft)                                          │
//! │                                                                         │
//! │  ProductDraft ── validate ──► NewProduct                               │
//! │       │ (missing field → Ok(false))                                    │
//! │       ▼                                                                 │
//! │  INSERT INTO products (...)                                            │
//! │  ON CONFLICT(name, country, category) DO UPDATE SET price, emoji       │
//! │       │                                                                 │
//! │       ├── no row with that key  → new row, new id                      │
//! │       └── existing row          → updated in place, id kept            │
//! │                                                                         │
//! │  One statement: no window between the lookup and the write.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbot_core::validation::validate_product_draft;
use shopbot_core::{NewProduct, Product, ProductChanges, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, price, emoji, country, category, created_at, updated_at";

/// Treats `Some("")` the same as `None` for optional filters.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let weapons = repo.load(Some("jp"), Some("weapon")).await?;
/// let saved = repo.save(&draft).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by country and/or category.
    ///
    /// Absent or empty filters match everything. Results are in insertion
    /// order.
    pub async fn load(
        &self,
        country: Option<&str>,
        category: Option<&str>,
    ) -> DbResult<Vec<Product>> {
        debug!(?country, ?category, "Loading products");

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"
        ));
        if let Some(country) = non_empty(country) {
            query.push(" AND country = ").push_bind(country);
        }
        if let Some(category) = non_empty(category) {
            query.push(" AND category = ").push_bind(category);
        }
        query.push(" ORDER BY rowid");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    /// Counts products matching the optional filters.
    pub async fn count(&self, country: Option<&str>, category: Option<&str>) -> DbResult<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products WHERE 1 = 1");
        if let Some(country) = non_empty(country) {
            query.push(" AND country = ").push_bind(country);
        }
        if let Some(category) = non_empty(category) {
            query.push(" AND category = ").push_bind(category);
        }

        let count: i64 = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Validates and upserts one product.
    ///
    /// ## Returns
    /// * `Ok(true)` - product inserted, or the existing product with the same
    ///   (name, country, category) updated in place
    /// * `Ok(false)` - a required field is missing; nothing is written
    pub async fn save(&self, draft: &ProductDraft) -> DbResult<bool> {
        let product = match validate_product_draft(draft) {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Rejected product draft");
                return Ok(false);
            }
        };

        self.upsert(&product).await?;
        Ok(true)
    }

    /// Upserts a validated product and returns the stored row.
    pub async fn upsert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(
            name = %product.name,
            country = %product.country,
            category = %product.category,
            "Upserting product"
        );

        let now = Utc::now();

        let stored = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                id, name, price, emoji, country, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(name, country, category) DO UPDATE SET
                price = excluded.price,
                emoji = excluded.emoji,
                updated_at = excluded.updated_at
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.emoji)
        .bind(&product.country)
        .bind(&product.category)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Saves each draft in turn.
    ///
    /// Invalid drafts are skipped; they do not stop the batch.
    ///
    /// ## Returns
    /// Number of drafts that were saved.
    pub async fn batch_add(&self, drafts: &[ProductDraft]) -> DbResult<usize> {
        let mut saved = 0;

        for draft in drafts {
            if self.save(draft).await? {
                saved += 1;
            }
        }

        info!(saved, skipped = drafts.len() - saved, "Batch add complete");
        Ok(saved)
    }

    /// Deletes every product with this name, narrowed by the optional filters.
    ///
    /// ## Returns
    /// * `Ok(true)` - at least one product was deleted
    /// * `Ok(false)` - nothing matched
    pub async fn remove(
        &self,
        name: &str,
        category: Option<&str>,
        country: Option<&str>,
    ) -> DbResult<bool> {
        debug!(name = %name, ?category, ?country, "Removing product");

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM products WHERE name = ");
        query.push_bind(name);
        if let Some(category) = non_empty(category) {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(country) = non_empty(country) {
            query.push(" AND country = ").push_bind(country);
        }

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Applies a partial update to the product found by (name, country).
    ///
    /// When several categories hold a product with that name, the oldest one
    /// is updated.
    ///
    /// ## Returns
    /// * `Ok(true)` - product found; provided fields written (or nothing to
    ///   write)
    /// * `Ok(false)` - no product with that name in that country, or the
    ///   change would move it onto another product's (name, country,
    ///   category); nothing is written
    pub async fn update(
        &self,
        name: &str,
        country: &str,
        changes: &ProductChanges,
    ) -> DbResult<bool> {
        let id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM products
            WHERE name = ?1 AND country = ?2
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(country)
        .fetch_optional(&self.pool)
        .await?;

        let Some(id) = id else {
            debug!(name = %name, country = %country, "Product to update not found");
            return Ok(false);
        };

        let changes = changes.clone().normalized();
        if changes.is_empty() {
            debug!(id = %id, "No product fields to update");
            return Ok(true);
        }

        debug!(id = %id, ?changes, "Updating product");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE products SET ");
        let mut fields = query.separated(", ");
        if let Some(emoji) = changes.emoji {
            fields.push("emoji = ").push_bind_unseparated(emoji);
        }
        if let Some(new_name) = changes.name {
            fields.push("name = ").push_bind_unseparated(new_name);
        }
        if let Some(price) = changes.price {
            fields.push("price = ").push_bind_unseparated(price);
        }
        if let Some(category) = changes.category {
            fields.push("category = ").push_bind_unseparated(category);
        }
        if let Some(new_country) = changes.country {
            fields.push("country = ").push_bind_unseparated(new_country);
        }
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        query.push(" WHERE id = ").push_bind(id.clone());

        match query.build().execute(&self.pool).await.map_err(DbError::from) {
            Ok(_) => Ok(true),
            Err(DbError::UniqueViolation { field, .. }) => {
                warn!(
                    id = %id,
                    key = %field,
                    "Product update collides with an existing product"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes every product in a category, optionally only in one country.
    ///
    /// ## Returns
    /// Number of products deleted.
    pub async fn clear_category(&self, category: &str, country: Option<&str>) -> DbResult<u64> {
        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM products WHERE category = ");
        query.push_bind(category);
        if let Some(country) = non_empty(country) {
            query.push(" AND country = ").push_bind(country);
        }

        let result = query.build().execute(&self.pool).await?;

        info!(category = %category, ?country, deleted = result.rows_affected(), "Category cleared");
        Ok(result.rows_affected())
    }

    /// Deletes every product of one country.
    pub async fn delete_by_country(&self, country: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE country = ?1")
            .bind(country)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes the whole catalog.
    ///
    /// ## Returns
    /// Number of products deleted.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;

        warn!(deleted = result.rows_affected(), "All products deleted");
        Ok(result.rows_affected())
    }

    /// Inserts a "no product" placeholder for every empty (country, category)
    /// pair.
    ///
    /// Countries are the outer loop, categories the inner one.
    ///
    /// ## Returns
    /// Number of placeholders inserted. Zero on a second run.
    pub async fn add_placeholders<C, K>(
        &self,
        countries: &[C],
        categories: &[K],
    ) -> DbResult<usize>
    where
        C: AsRef<str>,
        K: AsRef<str>,
    {
        let mut inserted = 0;

        for country in countries {
            let country = country.as_ref();
            for category in categories {
                let category = category.as_ref();

                if self.count(Some(country), Some(category)).await? == 0 {
                    self.upsert(&NewProduct::placeholder(country, category))
                        .await?;
                    inserted += 1;
                }
            }
        }

        info!(inserted, "Placeholders added");
        Ok(inserted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_repo() -> ProductRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .products()
    }

    fn draft(name: &str, price: f64, country: &str, category: &str) -> ProductDraft {
        ProductDraft {
            name: Some(name.to_string()),
            price: Some(price),
            emoji: Some("🗡️".to_string()),
            country: Some(country.to_string()),
            category: Some(category.to_string()),
        }
    }

    #[tokio::test]
    async fn test_load_with_filters() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Gold", 5.0, "jp", "money")).await.unwrap();
        repo.save(&draft("Sword", 90.0, "th", "weapon")).await.unwrap();

        assert_eq!(repo.load(None, None).await.unwrap().len(), 3);
        assert_eq!(repo.load(Some("jp"), None).await.unwrap().len(), 2);
        assert_eq!(repo.load(None, Some("weapon")).await.unwrap().len(), 2);
        assert_eq!(repo.load(Some(""), Some("")).await.unwrap().len(), 3);

        let jp_weapons = repo.load(Some("jp"), Some("weapon")).await.unwrap();
        assert_eq!(jp_weapons.len(), 1);
        assert_eq!(jp_weapons[0].name, "Sword");
        assert_eq!(jp_weapons[0].price, 100.0);
        assert!(!jp_weapons[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_save_same_key_updates_in_place() {
        let repo = test_repo().await;

        assert!(repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap());
        let first = repo.load(Some("jp"), Some("weapon")).await.unwrap();

        let mut second = draft("Sword", 150.0, "jp", "weapon");
        second.emoji = Some("⚔️".to_string());
        assert!(repo.save(&second).await.unwrap());

        let stored = repo.load(Some("jp"), Some("weapon")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, first[0].id);
        assert_eq!(stored[0].price, 150.0);
        assert_eq!(stored[0].emoji, "⚔️");
    }

    #[tokio::test]
    async fn test_save_rejects_missing_fields() {
        let repo = test_repo().await;

        let mut missing_emoji = draft("Sword", 100.0, "jp", "weapon");
        missing_emoji.emoji = None;

        assert!(!repo.save(&missing_emoji).await.unwrap());
        assert_eq!(repo.count(None, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_add_counts_valid_drafts() {
        let repo = test_repo().await;

        let mut no_price = draft("Shield", 0.0, "jp", "armor");
        no_price.price = None;
        let mut no_category = draft("Helmet", 10.0, "jp", "armor");
        no_category.category = None;

        let drafts = vec![
            draft("Sword", 100.0, "jp", "weapon"),
            no_price,
            draft("Bow", 80.0, "jp", "weapon"),
            no_category,
            draft("Gold", 1.0, "th", "money"),
        ];

        assert_eq!(repo.batch_add(&drafts).await.unwrap(), 3);
        assert_eq!(repo.count(None, None).await.unwrap(), 3);
        assert!(repo.load(None, Some("armor")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_product() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Sword", 90.0, "th", "weapon")).await.unwrap();
        repo.save(&draft("Sword", 20.0, "th", "toy")).await.unwrap();

        assert!(repo.remove("Sword", Some("toy"), None).await.unwrap());
        assert_eq!(repo.count(None, None).await.unwrap(), 2);

        assert!(repo.remove("Sword", None, Some("jp")).await.unwrap());
        assert_eq!(repo.count(None, None).await.unwrap(), 1);

        assert!(!repo.remove("Axe", None, None).await.unwrap());

        assert!(repo.remove("Sword", None, None).await.unwrap());
        assert_eq!(repo.count(None, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_without_changes_leaves_product_untouched() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        let before = repo.load(None, None).await.unwrap();

        assert!(repo
            .update("Sword", "jp", &ProductChanges::default())
            .await
            .unwrap());

        let empty_strings = ProductChanges {
            name: Some(String::new()),
            emoji: Some(String::new()),
            ..Default::default()
        };
        assert!(repo.update("Sword", "jp", &empty_strings).await.unwrap());

        assert_eq!(repo.load(None, None).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_zero_price() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();

        let changes = ProductChanges {
            price: Some(0.0),
            ..Default::default()
        };
        assert!(repo.update("Sword", "jp", &changes).await.unwrap());

        let stored = repo.load(None, None).await.unwrap();
        assert_eq!(stored[0].price, 0.0);
        assert_eq!(stored[0].emoji, "🗡️");
    }

    #[tokio::test]
    async fn test_update_several_fields() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        let id = repo.load(None, None).await.unwrap()[0].id.clone();

        let changes = ProductChanges {
            name: Some("Katana".to_string()),
            emoji: Some("⚔️".to_string()),
            category: Some("blade".to_string()),
            country: Some("th".to_string()),
            price: None,
        };
        assert!(repo.update("Sword", "jp", &changes).await.unwrap());

        let stored = repo.load(Some("th"), Some("blade")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].name, "Katana");
        assert_eq!(stored[0].emoji, "⚔️");
        assert_eq!(stored[0].price, 100.0);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();

        let changes = ProductChanges {
            price: Some(1.0),
            ..Default::default()
        };
        assert!(!repo.update("Sword", "th", &changes).await.unwrap());
        assert!(!repo.update("Axe", "jp", &changes).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_onto_existing_key_returns_false() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Bow", 80.0, "jp", "weapon")).await.unwrap();
        let before = repo.load(None, None).await.unwrap();

        let changes = ProductChanges {
            name: Some("Sword".to_string()),
            ..Default::default()
        };
        assert!(!repo.update("Bow", "jp", &changes).await.unwrap());
        assert_eq!(repo.load(None, None).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_placeholder_onto_sibling_placeholder_returns_false() {
        let repo = test_repo().await;
        repo.add_placeholders(&["jp"][..], &["weapon", "money"][..])
            .await
            .unwrap();

        let changes = ProductChanges {
            category: Some("money".to_string()),
            ..Default::default()
        };
        assert!(!repo.update("no product", "jp", &changes).await.unwrap());
        assert_eq!(repo.count(Some("jp"), Some("weapon")).await.unwrap(), 1);
        assert_eq!(repo.count(Some("jp"), Some("money")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_category() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Bow", 80.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Sword", 90.0, "th", "weapon")).await.unwrap();
        repo.save(&draft("Gold", 1.0, "th", "money")).await.unwrap();

        assert_eq!(repo.clear_category("weapon", Some("jp")).await.unwrap(), 2);
        assert_eq!(repo.clear_category("weapon", None).await.unwrap(), 1);
        assert_eq!(repo.clear_category("weapon", None).await.unwrap(), 0);
        assert_eq!(repo.count(None, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();
        repo.save(&draft("Gold", 1.0, "th", "money")).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_placeholders_only_fill_empty_pairs() {
        let repo = test_repo().await;
        repo.save(&draft("Sword", 100.0, "jp", "weapon")).await.unwrap();

        let countries = ["jp", "th"];
        let categories = ["weapon", "money"];

        assert_eq!(repo.add_placeholders(&countries[..], &categories[..]).await.unwrap(), 3);
        assert_eq!(repo.add_placeholders(&countries[..], &categories[..]).await.unwrap(), 0);

        let jp_weapons = repo.load(Some("jp"), Some("weapon")).await.unwrap();
        assert_eq!(jp_weapons.len(), 1);
        assert!(!jp_weapons[0].is_placeholder());

        let th_money = repo.load(Some("th"), Some("money")).await.unwrap();
        assert_eq!(th_money.len(), 1);
        assert!(th_money[0].is_placeholder());
        assert_eq!(th_money[0].price, 0.0);
    }

    #[tokio::test]
    async fn test_placeholders_insert_countries_outer_categories_inner() {
        let repo = test_repo().await;

        let countries = vec!["jp".to_string(), "th".to_string()];
        let categories = vec!["weapon".to_string(), "money".to_string()];
        repo.add_placeholders(&countries[..], &categories[..]).await.unwrap();

        let order: Vec<(String, String)> = repo
            .load(None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.country, p.category))
            .collect();

        assert_eq!(
            order,
            vec![
                ("jp".to_string(), "weapon".to_string()),
                ("jp".to_string(), "money".to_string()),
                ("th".to_string(), "weapon".to_string()),
                ("th".to_string(), "money".to_string()),
            ]
        );
    }
}
