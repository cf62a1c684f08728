//! # Stock Repository
//!
//! Database operations for the parts catalog, including the core of the
//! whole system: the stock ledger transaction.
//!
//! ## The Ledger Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create(): item + opening movement, atomically           │
//! │                                                                         │
//! │  validate input (never reaches storage on failure)                      │
//! │       │                                                                 │
//! │  BEGIN ── one connection for the whole span ──────────────────────────┐ │
//! │  │    │                                                               │ │
//! │  │    ▼                                                               │ │
//! │  │  advance counter → "00042"                                         │ │
//! │  │    │                                                               │ │
//! │  │    ▼                                                               │ │
//! │  │  defensive check: code free?  ──no──► CodeConflict, ROLLBACK       │ │
//! │  │    │                                                               │ │
//! │  │    ▼                                                               │ │
//! │  │  INSERT stock_items (current_stock = 0, initial_stock = q)         │ │
//! │  │    │         │                                                     │ │
//! │  │    │         └─ identity index hit ──► DuplicateItem, ROLLBACK     │ │
//! │  │    ▼                                                               │ │
//! │  │  INSERT opening_balance movement (qty q, doc "CAD-00042")          │ │
//! │  │    │         └─ ledger trigger raises current_stock 0 → q          │ │
//! │  │  COMMIT                                                            │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  re-read by synthetic id → post-aggregation row returned to caller     │
//! │                                                                         │
//! │  Either both rows exist or neither does. No partial state, ever.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The zero-quantity case gets its opening movement too: the quantity is
//! validated non-negative up front, so there is no skip branch.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::codes;
use crate::error::{DbError, DbResult};
use almoxa_core::validation::{
    validate_new_stock_item, validate_search_query, validate_stock_item_update,
};
use almoxa_core::{generate_id, MovementKind, NewStockItem, StockItem, StockItemUpdate};

/// Column list shared by every stock item SELECT.
const COLUMNS: &str = "id, fixed_code, part_code, classification, description, application, \
     manufacturer, current_stock, min_stock, initial_stock, launched_on, \
     created_at, created_by, updated_at, updated_by, deleted_at, deleted_by, is_deleted";

/// Repository for stock item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = StockRepository::new(pool);
///
/// let item = repo.create(new_item).await?;
/// let hits = repo.search("filtro", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    // =========================================================================
    // The Ledger Transaction
    // =========================================================================

    /// Creates a stock item together with its opening-balance movement,
    /// atomically. This is the ONLY way an item row comes into existence;
    /// nothing inserts into `stock_items` without going through the code
    /// generator first.
    ///
    /// ## Returns
    /// The created item, re-read after commit so `current_stock` reflects
    /// the opening movement applied by the ledger trigger.
    ///
    /// ## Errors
    /// - `Validation` - blank description, negative quantity/cost
    /// - `DuplicateItem` - identity triple already in use, rolled back
    /// - `CodeConflict` - generated code already taken, rolled back
    /// - anything else from storage - rolled back and re-thrown
    pub async fn create(&self, input: NewStockItem) -> DbResult<StockItem> {
        let input = validate_new_stock_item(&input)?;

        debug!(description = %input.description, "Creating stock item");

        let mut tx = self.pool.begin().await?;

        let id = match self.create_in_tx(&mut tx, &input).await {
            Ok(id) => id,
            Err(e) => {
                // Best effort: dropping the transaction would also roll
                // back, but an eager rollback releases the connection now.
                let _ = tx.rollback().await;
                return Err(e);
            }
        };

        tx.commit().await?;

        // Step 7 of the contract: re-read AFTER commit, because the
        // aggregation side effect is not visible in the statement that
        // inserted the movement.
        let item = self.get_by_id(&id).await?;
        item.ok_or_else(|| {
            DbError::Internal(format!(
                "stock item {} vanished between commit and re-read",
                id
            ))
        })
    }

    /// The body of the ledger transaction. Runs entirely on the caller's
    /// transaction; the caller commits or rolls back.
    async fn create_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        input: &NewStockItem,
    ) -> DbResult<String> {
        let fixed_code = codes::next_fixed_code(tx).await?;

        // Defensive check. The counter advance should make this
        // impossible; if it fires, the sequence and the table disagree
        // and the conflict must be surfaced, not retried.
        let taken: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM stock_items WHERE fixed_code = ?1)")
                .bind(&fixed_code)
                .fetch_one(&mut **tx)
                .await?;
        if taken != 0 {
            return Err(DbError::CodeConflict { code: fixed_code });
        }

        let id = generate_id();
        let now = Utc::now();

        // current_stock is forced to 0 here; the declared opening
        // quantity lands in initial_stock (historical record) and reaches
        // current_stock only through the opening movement below.
        sqlx::query(
            r#"
            INSERT INTO stock_items (
                id, fixed_code, part_code, classification, description,
                application, manufacturer, current_stock, min_stock,
                initial_stock, launched_on,
                created_at, created_by, updated_at, is_deleted
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, 0, ?8,
                ?9, ?10,
                ?11, ?12, ?11, 0
            )
            "#,
        )
        .bind(&id)
        .bind(&fixed_code)
        .bind(&input.part_code)
        .bind(&input.classification)
        .bind(&input.description)
        .bind(&input.application)
        .bind(&input.manufacturer)
        .bind(input.min_stock)
        .bind(input.opening_quantity)
        .bind(input.launched_on)
        .bind(now)
        .bind(&input.created_by)
        .execute(&mut **tx)
        .await
        .map_err(|e| self.map_insert_error(e, input, &fixed_code))?;

        // The opening movement is logged unconditionally — a zero
        // quantity is a valid opening balance and gets its ledger entry
        // like any other.
        let document_ref = format!("CAD-{}", fixed_code);

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                item_id, kind, quantity, unit_cost,
                document_ref, note, moved_at, moved_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(MovementKind::OpeningBalance)
        .bind(input.opening_quantity)
        .bind(input.opening_unit_cost)
        .bind(&document_ref)
        .bind(now)
        .bind(&input.created_by)
        .execute(&mut **tx)
        .await?;

        debug!(id = %id, fixed_code = %fixed_code, "Stock item inserted with opening movement");

        Ok(id)
    }

    /// Refines the generic constraint mapping for the item INSERT, where
    /// we know which index means what.
    fn map_insert_error(&self, err: sqlx::Error, input: &NewStockItem, code: &str) -> DbError {
        match DbError::from(err) {
            DbError::UniqueViolation { field, .. } if field.contains("ux_stock_items_identity") => {
                DbError::DuplicateItem {
                    part_code: input.part_code.clone().unwrap_or_default(),
                    description: input.description.clone(),
                    manufacturer: input.manufacturer.clone().unwrap_or_default(),
                }
            }
            DbError::UniqueViolation { field, .. } if field.contains("fixed_code") => {
                DbError::CodeConflict {
                    code: code.to_string(),
                }
            }
            other => other,
        }
    }

    // =========================================================================
    // Cadastral Update / Soft Delete
    // =========================================================================

    /// Updates the cadastral fields of a non-deleted item.
    ///
    /// Can never touch the fixed code, the synthetic id, `current_stock`,
    /// or `initial_stock` — the statement simply has no parameters for
    /// them.
    ///
    /// ## Errors
    /// - `NotFound` - id unknown OR row soft-deleted
    /// - `DuplicateItem` - update would collide on the identity triple
    pub async fn update(&self, id: &str, input: StockItemUpdate) -> DbResult<StockItem> {
        let input = validate_stock_item_update(&input)?;

        debug!(id = %id, "Updating stock item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET
                description = ?2,
                classification = ?3,
                manufacturer = ?4,
                part_code = ?5,
                application = ?6,
                launched_on = ?7,
                min_stock = ?8,
                updated_at = ?9,
                updated_by = ?10
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(&input.description)
        .bind(&input.classification)
        .bind(&input.manufacturer)
        .bind(&input.part_code)
        .bind(&input.application)
        .bind(input.launched_on)
        .bind(input.min_stock)
        .bind(now)
        .bind(&input.updated_by)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.contains("ux_stock_items_identity") => {
                DbError::DuplicateItem {
                    part_code: input.part_code.clone().unwrap_or_default(),
                    description: input.description.clone(),
                    manufacturer: input.manufacturer.clone().unwrap_or_default(),
                }
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("stock item", id));
        }

        let item = self.get_by_id(id).await?;
        item.ok_or_else(|| DbError::Internal(format!("stock item {} vanished after update", id)))
    }

    /// Soft-deletes an item: flag + timestamp + actor, guarded on the row
    /// currently being non-deleted. Rows are NEVER physically removed —
    /// movements and work-order materials keep referencing the synthetic
    /// id, and the restrictive foreign keys would forbid removal anyway.
    ///
    /// ## Errors
    /// - `NotFound` - id unknown
    /// - `AlreadyDeleted` - row exists but is already flagged; the first
    ///   deletion timestamp stays untouched
    pub async fn soft_delete(&self, id: &str, deleted_by: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting stock item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET
                is_deleted = 1,
                deleted_at = ?2,
                deleted_by = ?3
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(deleted_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Disambiguate: absent row vs already-flagged row.
            let flagged: Option<i64> =
                sqlx::query_scalar("SELECT is_deleted FROM stock_items WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match flagged {
                None => Err(DbError::not_found("stock item", id)),
                Some(_) => Err(DbError::already_deleted("stock item", id)),
            };
        }

        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an item by its synthetic id. Returns soft-deleted rows too;
    /// callers inspect `is_deleted` when it matters.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockItem>> {
        let sql = format!("SELECT {} FROM stock_items WHERE id = ?1", COLUMNS);

        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Gets an item by its fixed code.
    pub async fn get_by_fixed_code(&self, fixed_code: &str) -> DbResult<Option<StockItem>> {
        let sql = format!("SELECT {} FROM stock_items WHERE fixed_code = ?1", COLUMNS);

        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(fixed_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists non-deleted items in fixed-code order.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items WHERE is_deleted = 0 ORDER BY fixed_code LIMIT ?1",
            COLUMNS
        );

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Searches the catalog using full-text search.
    ///
    /// ## How It Works
    /// 1. FTS5 MATCH over description, part code, manufacturer
    /// 2. Prefix matching: "filt" finds "Filtro de óleo"
    /// 3. Soft-deleted items never appear
    ///
    /// An empty query falls back to [`list`](Self::list).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<StockItem>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching stock items");

        if query.is_empty() {
            return self.list(limit).await;
        }

        // Quote the term so part codes like "FO-100" survive the FTS5
        // query syntax, then add the prefix wildcard.
        let fts_query = format!("\"{}\"*", query.replace('"', "\"\""));

        // Qualify the columns: the FTS table shares names with the base
        // table (description, part_code, manufacturer).
        let qualified = COLUMNS
            .split(", ")
            .map(|c| format!("s.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            r#"
            SELECT {}
            FROM stock_items s
            INNER JOIN stock_items_fts ON s.rowid = stock_items_fts.rowid
            WHERE stock_items_fts MATCH ?1
            AND s.is_deleted = 0
            ORDER BY rank
            LIMIT ?2
            "#,
            qualified
        );

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(fts_query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Search returned items");
        Ok(items)
    }

    /// Lists non-deleted items at or below their reorder threshold.
    pub async fn below_min_stock(&self) -> DbResult<Vec<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items \
             WHERE is_deleted = 0 AND current_stock <= min_stock \
             ORDER BY fixed_code",
            COLUMNS
        );

        let items = sqlx::query_as::<_, StockItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Counts non-deleted items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_items WHERE is_deleted = 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use almoxa_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn filtro_de_oleo() -> NewStockItem {
        NewStockItem {
            description: "Filtro de óleo".to_string(),
            classification: Some("filtros".to_string()),
            manufacturer: Some("Bosch".to_string()),
            part_code: Some("FO-100".to_string()),
            application: Some("Motor WEG W22".to_string()),
            launched_on: None,
            min_stock: 2,
            opening_quantity: 10,
            opening_unit_cost: Money::from_cents(550),
            created_by: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let db = test_db().await;

        let item = db.stock().create(filtro_de_oleo()).await.unwrap();

        // Fixed code: exactly 5 digits.
        assert_eq!(item.fixed_code.len(), 5);
        assert!(item.fixed_code.chars().all(|c| c.is_ascii_digit()));

        // The opening movement raised current_stock from 0 to 10.
        assert_eq!(item.current_stock, 10);
        assert_eq!(item.initial_stock, 10);
        assert!(!item.is_deleted);

        // Exactly one opening-balance movement with the declared
        // quantity, cost, and synthesized document reference.
        let movements = db.movements().list_for_item(&item.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        let m = &movements[0];
        assert_eq!(m.kind, MovementKind::OpeningBalance);
        assert_eq!(m.quantity, 10);
        assert_eq!(m.unit_cost, Money::from_cents(550));
        assert_eq!(m.document_ref.as_deref(), Some(format!("CAD-{}", item.fixed_code).as_str()));
    }

    #[tokio::test]
    async fn test_fixed_codes_increase_and_never_collide() {
        let db = test_db().await;

        let mut previous = String::new();
        for i in 0..20 {
            let mut input = NewStockItem::new(format!("Peça {}", i), "user-1");
            input.part_code = Some(format!("P-{}", i));
            let item = db.stock().create(input).await.unwrap();

            assert_eq!(item.fixed_code.len(), 5);
            assert!(item.fixed_code > previous, "codes must be strictly increasing");
            previous = item.fixed_code;
        }

        assert_eq!(db.stock().count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_zero_opening_quantity_still_logs_movement() {
        let db = test_db().await;

        let item = db
            .stock()
            .create(NewStockItem::new("Correia A-42", "user-1"))
            .await
            .unwrap();

        assert_eq!(item.current_stock, 0);

        let movements = db.movements().list_for_item(&item.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::OpeningBalance);
        assert_eq!(movements[0].quantity, 0);
    }

    #[tokio::test]
    async fn test_blank_description_rejected_before_storage() {
        let db = test_db().await;

        let err = db
            .stock()
            .create(NewStockItem::new("   ", "user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing was persisted and no counter value was burned.
        assert_eq!(db.stock().count().await.unwrap(), 0);
        let item = db.stock().create(filtro_de_oleo()).await.unwrap();
        assert_eq!(item.fixed_code, "00001");
    }

    #[tokio::test]
    async fn test_duplicate_identity_rolls_back_entirely() {
        let db = test_db().await;

        let first = db.stock().create(filtro_de_oleo()).await.unwrap();

        let err = db.stock().create(filtro_de_oleo()).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateItem { .. }));

        // Exactly one item row persists, and no stray movement from the
        // failed attempt.
        assert_eq!(db.stock().count().await.unwrap(), 1);
        let movements = db.movements().list_for_item(&first.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_same_description_different_manufacturer_is_allowed() {
        let db = test_db().await;

        db.stock().create(filtro_de_oleo()).await.unwrap();

        let mut other = filtro_de_oleo();
        other.manufacturer = Some("Mann".to_string());
        db.stock().create(other).await.unwrap();

        assert_eq!(db.stock().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_code_conflict_from_out_of_band_insert() {
        let db = test_db().await;

        // A row inserted outside the normal path, claiming the code the
        // counter will hand out next. This is the data-integrity fault
        // the defensive check exists for.
        sqlx::query(
            r#"
            INSERT INTO stock_items (
                id, fixed_code, description, current_stock, min_stock,
                initial_stock, created_at, created_by, updated_at, is_deleted
            ) VALUES ('rogue', '00001', 'inserted by hand', 0, 0, 0,
                      '2026-01-01T00:00:00Z', 'dba', '2026-01-01T00:00:00Z', 0)
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.stock().create(filtro_de_oleo()).await.unwrap_err();
        assert!(matches!(err, DbError::CodeConflict { ref code } if code == "00001"));

        // The attempt left nothing behind.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_update_touches_cadastral_fields_only() {
        let db = test_db().await;

        let item = db.stock().create(filtro_de_oleo()).await.unwrap();

        let updated = db
            .stock()
            .update(
                &item.id,
                StockItemUpdate {
                    description: "Filtro de óleo HD".to_string(),
                    classification: item.classification.clone(),
                    manufacturer: item.manufacturer.clone(),
                    part_code: Some("FO-100B".to_string()),
                    application: item.application.clone(),
                    launched_on: None,
                    min_stock: 4,
                    updated_by: "user-2".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description, "Filtro de óleo HD");
        assert_eq!(updated.min_stock, 4);
        assert_eq!(updated.updated_by.as_deref(), Some("user-2"));

        // Immutables survived the update.
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.fixed_code, item.fixed_code);
        assert_eq!(updated.current_stock, 10);
        assert_eq!(updated.initial_stock, 10);
    }

    #[tokio::test]
    async fn test_update_missing_or_deleted_is_not_found() {
        let db = test_db().await;

        let update = StockItemUpdate {
            description: "x".to_string(),
            classification: None,
            manufacturer: None,
            part_code: None,
            application: None,
            launched_on: None,
            min_stock: 0,
            updated_by: "user-1".to_string(),
        };

        // Unknown synthetic id.
        let err = db.stock().update("no-such-id", update.clone()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Soft-deleted target.
        let item = db.stock().create(filtro_de_oleo()).await.unwrap();
        db.stock().soft_delete(&item.id, "user-1").await.unwrap();

        let err = db.stock().update(&item.id, update).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_collision_maps_to_duplicate_item() {
        let db = test_db().await;

        db.stock().create(filtro_de_oleo()).await.unwrap();

        let mut other = filtro_de_oleo();
        other.part_code = Some("FA-200".to_string());
        other.description = "Filtro de ar".to_string();
        let other = db.stock().create(other).await.unwrap();

        // Renaming "Filtro de ar" onto the first item's triple collides.
        let err = db
            .stock()
            .update(
                &other.id,
                StockItemUpdate {
                    description: "Filtro de óleo".to_string(),
                    classification: None,
                    manufacturer: Some("Bosch".to_string()),
                    part_code: Some("FO-100".to_string()),
                    application: None,
                    launched_on: None,
                    min_stock: 0,
                    updated_by: "user-1".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::DuplicateItem { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_twice() {
        let db = test_db().await;

        let item = db.stock().create(filtro_de_oleo()).await.unwrap();

        db.stock().soft_delete(&item.id, "user-1").await.unwrap();

        let deleted = db.stock().get_by_id(&item.id).await.unwrap().unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.deleted_at.is_some());
        assert_eq!(deleted.deleted_by.as_deref(), Some("user-1"));
        let first_deleted_at = deleted.deleted_at;

        // Second delete: AlreadyDeleted, and the timestamp is not rewritten.
        let err = db.stock().soft_delete(&item.id, "user-2").await.unwrap_err();
        assert!(matches!(err, DbError::AlreadyDeleted { .. }));

        let still = db.stock().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(still.deleted_at, first_deleted_at);
        assert_eq!(still.deleted_by.as_deref(), Some("user-1"));

        // Unknown id is NotFound, not AlreadyDeleted.
        let err = db.stock().soft_delete("no-such-id", "user-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deleting_frees_the_identity_triple() {
        let db = test_db().await;

        let item = db.stock().create(filtro_de_oleo()).await.unwrap();
        db.stock().soft_delete(&item.id, "user-1").await.unwrap();

        // The partial unique index only covers non-deleted rows, so the
        // triple can be catalogued again.
        let again = db.stock().create(filtro_de_oleo()).await.unwrap();
        assert_ne!(again.id, item.id);
        assert_ne!(again.fixed_code, item.fixed_code);
    }

    #[tokio::test]
    async fn test_search_finds_live_items_only() {
        let db = test_db().await;

        let kept = db.stock().create(filtro_de_oleo()).await.unwrap();

        let mut gone = filtro_de_oleo();
        gone.part_code = Some("FO-200".to_string());
        gone.description = "Filtro de combustível".to_string();
        let gone = db.stock().create(gone).await.unwrap();
        db.stock().soft_delete(&gone.id, "user-1").await.unwrap();

        let hits = db.stock().search("filtro", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, kept.id);

        // Part codes with hyphens survive the FTS query syntax.
        let hits = db.stock().search("FO-100", 20).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Empty query falls back to the plain listing.
        let hits = db.stock().search("  ", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_below_min_stock() {
        let db = test_db().await;

        // current 10, min 2 → fine
        db.stock().create(filtro_de_oleo()).await.unwrap();

        // current 1, min 5 → flagged
        let mut low = NewStockItem::new("Rolamento 6204", "user-1");
        low.min_stock = 5;
        low.opening_quantity = 1;
        let low = db.stock().create(low).await.unwrap();

        let flagged = db.stock().below_min_stock().await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, low.id);
    }

    #[tokio::test]
    async fn test_get_by_fixed_code() {
        let db = test_db().await;

        let item = db.stock().create(filtro_de_oleo()).await.unwrap();

        let found = db
            .stock()
            .get_by_fixed_code(&item.fixed_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, item.id);

        assert!(db.stock().get_by_fixed_code("99999").await.unwrap().is_none());
    }
}
