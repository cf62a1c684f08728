//! # Movement Repository
//!
//! The stock movement ledger: every change to a quantity on hand is an
//! append-only row here, and `stock_items.current_stock` is the signed
//! sum of those rows.
//!
//! ## Aggregate Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How current_stock Stays Consistent                         │
//! │                                                                         │
//! │  record(movement)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO stock_movements ... (guarded on a live item)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  trg_stock_movements_apply (database trigger)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE stock_items SET current_stock += signed quantity               │
//! │                                                                         │
//! │  Application code NEVER writes current_stock. The trigger is the       │
//! │  single writer; ledger_balance() lets tests and diagnostics verify     │
//! │  current_stock == SUM(signed quantities) at any time.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use almoxa_core::validation::validate_new_movement;
use almoxa_core::{NewMovement, StockMovement};

/// Column list shared by every movement SELECT.
const COLUMNS: &str = "id, item_id, kind, quantity, unit_cost, document_ref, note, moved_at, moved_by";

/// Repository for stock movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement against a live (non-deleted) stock item.
    ///
    /// One atomic statement: the INSERT only fires when the item exists
    /// and is not soft-deleted, so there is no check-then-insert window.
    /// The ledger trigger applies the signed quantity as a side effect.
    ///
    /// ## Errors
    /// - `Validation` - negative quantity or cost, blank actor
    /// - `NotFound` - item absent or soft-deleted
    pub async fn record(&self, input: NewMovement) -> DbResult<StockMovement> {
        validate_new_movement(&input)?;

        debug!(item_id = %input.item_id, kind = ?input.kind, quantity = input.quantity, "Recording movement");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO stock_movements (
                item_id, kind, quantity, unit_cost,
                document_ref, note, moved_at, moved_by
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
            WHERE EXISTS (
                SELECT 1 FROM stock_items WHERE id = ?1 AND is_deleted = 0
            )
            "#,
        )
        .bind(&input.item_id)
        .bind(input.kind)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .bind(&input.document_ref)
        .bind(&input.note)
        .bind(now)
        .bind(&input.moved_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("stock item", &input.item_id));
        }

        let id = result.last_insert_rowid();
        let movement = self.get_by_id(id).await?;
        movement.ok_or_else(|| {
            DbError::Internal(format!("movement {} vanished after insert", id))
        })
    }

    /// Gets a movement by its ledger id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<StockMovement>> {
        let sql = format!("SELECT {} FROM stock_movements WHERE id = ?1", COLUMNS);

        let movement = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(movement)
    }

    /// Lists all movements for an item, oldest first.
    pub async fn list_for_item(&self, item_id: &str) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {} FROM stock_movements WHERE item_id = ?1 ORDER BY id",
            COLUMNS
        );

        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Computes the item's ledger balance: the sum of signed quantities.
    ///
    /// Diagnostics/verification only — reads should use the item's
    /// `current_stock`, which the trigger keeps equal to this sum.
    pub async fn ledger_balance(&self, item_id: &str) -> DbResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(
                CASE kind
                    WHEN 'purchase_in'     THEN quantity
                    WHEN 'adjustment_in'   THEN quantity
                    WHEN 'opening_balance' THEN quantity
                    ELSE -quantity
                END
            )
            FROM stock_movements
            WHERE item_id = ?1
            "#,
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance.unwrap_or(0))
    }

    /// Counts movements recorded against an item.
    pub async fn count_for_item(&self, item_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE item_id = ?1")
                .bind(item_id)
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
    use almoxa_core::{Money, MovementKind, NewStockItem, ValidationError};

    async fn db_with_item(opening: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut input = NewStockItem::new("Graxa EP-2", "user-1");
        input.opening_quantity = opening;
        let item = db.stock().create(input).await.unwrap();

        (db, item.id)
    }

    fn purchase(item_id: &str, quantity: i64) -> NewMovement {
        NewMovement {
            item_id: item_id.to_string(),
            kind: MovementKind::PurchaseIn,
            quantity,
            unit_cost: Money::from_cents(1200),
            document_ref: Some("NF-4471".to_string()),
            note: None,
            moved_by: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_applies_signed_quantity() {
        let (db, item_id) = db_with_item(10).await;

        db.movements().record(purchase(&item_id, 5)).await.unwrap();

        let mut out = purchase(&item_id, 3);
        out.kind = MovementKind::RequisitionOut;
        db.movements().record(out).await.unwrap();

        let item = db.stock().get_by_id(&item_id).await.unwrap().unwrap();
        assert_eq!(item.current_stock, 12); // 10 + 5 - 3
    }

    #[tokio::test]
    async fn test_current_stock_equals_ledger_balance() {
        let (db, item_id) = db_with_item(4).await;

        for (kind, qty) in [
            (MovementKind::PurchaseIn, 10),
            (MovementKind::WorkOrderOut, 6),
            (MovementKind::AdjustmentIn, 1),
            (MovementKind::AdjustmentOut, 2),
            (MovementKind::RequisitionOut, 3),
        ] {
            let mut m = purchase(&item_id, qty);
            m.kind = kind;
            db.movements().record(m).await.unwrap();
        }

        let item = db.stock().get_by_id(&item_id).await.unwrap().unwrap();
        let balance = db.movements().ledger_balance(&item_id).await.unwrap();

        assert_eq!(item.current_stock, balance);
        assert_eq!(balance, 4); // 4 + 10 - 6 + 1 - 2 - 3
        assert_eq!(db.movements().count_for_item(&item_id).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_record_against_unknown_item_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .movements()
            .record(purchase("no-such-item", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_record_against_deleted_item_is_not_found() {
        let (db, item_id) = db_with_item(10).await;

        db.stock().soft_delete(&item_id, "user-1").await.unwrap();

        let err = db.movements().record(purchase(&item_id, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The item still has only its opening movement; the stale
        // current_stock stays frozen.
        assert_eq!(db.movements().count_for_item(&item_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let (db, item_id) = db_with_item(10).await;

        let err = db.movements().record(purchase(&item_id, -5)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[tokio::test]
    async fn test_movement_round_trip() {
        let (db, item_id) = db_with_item(0).await;

        let recorded = db.movements().record(purchase(&item_id, 7)).await.unwrap();

        assert_eq!(recorded.item_id, item_id);
        assert_eq!(recorded.kind, MovementKind::PurchaseIn);
        assert_eq!(recorded.quantity, 7);
        assert_eq!(recorded.unit_cost, Money::from_cents(1200));
        assert_eq!(recorded.document_ref.as_deref(), Some("NF-4471"));
        assert_eq!(recorded.signed_quantity(), 7);

        let listed = db.movements().list_for_item(&item_id).await.unwrap();
        assert_eq!(listed.len(), 2); // opening + purchase
        assert_eq!(listed[1].id, recorded.id);
    }
}
