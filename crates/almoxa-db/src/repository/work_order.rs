//! # Work Order Repository
//!
//! Maintenance work orders and their material issues.
//!
//! ## Material Issue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │          issue_material(): material line + ledger entry                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    guard: order exists and is open         ──else──► NotFound          │
//! │    guard: item exists and is not deleted   ──else──► NotFound          │
//! │    INSERT work_order_materials                                         │
//! │    INSERT stock_movements (kind work_order_out, doc = order number)    │
//! │         └─ ledger trigger lowers the item's current_stock              │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The material line and the ledger entry exist together or not at all. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::codes;
use crate::error::{DbError, DbResult};
use almoxa_core::validation::{validate_new_work_order, validate_positive};
use almoxa_core::{
    generate_id, MovementKind, NewWorkOrder, WorkOrder, WorkOrderMaterial, WorkOrderStatus,
};

const COLUMNS: &str = "id, order_number, title, status, requested_by, \
     opened_at, closed_at, closed_by, created_by, updated_at";

const MATERIAL_COLUMNS: &str = "id, work_order_id, item_id, quantity, issued_at, issued_by";

/// Repository for work order database operations.
#[derive(Debug, Clone)]
pub struct WorkOrderRepository {
    pool: SqlitePool,
}

impl WorkOrderRepository {
    /// Creates a new WorkOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkOrderRepository { pool }
    }

    /// Opens a new work order. The order number comes from the shared
    /// counter inside the same transaction that inserts the row, exactly
    /// like stock item fixed codes.
    pub async fn create(&self, input: NewWorkOrder) -> DbResult<WorkOrder> {
        let input = validate_new_work_order(&input)?;

        debug!(title = %input.title, "Creating work order");

        let id = generate_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let order_number = match codes::next_order_number(&mut tx).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e);
            }
        };

        let insert = sqlx::query(
            r#"
            INSERT INTO work_orders (
                id, order_number, title, status, requested_by,
                opened_at, created_by, updated_at
            ) VALUES (?1, ?2, ?3, 'open', ?4, ?5, ?6, ?5)
            "#,
        )
        .bind(&id)
        .bind(&order_number)
        .bind(&input.title)
        .bind(&input.requested_by)
        .bind(now)
        .bind(&input.created_by)
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            let _ = tx.rollback().await;
            return Err(e.into());
        }

        tx.commit().await?;

        let order = self.get_by_id(&id).await?;
        order.ok_or_else(|| DbError::Internal(format!("work order {} vanished after commit", id)))
    }

    /// Issues material from stock to an open work order: one transaction
    /// inserting the material line and its `work_order_out` movement. The
    /// ledger trigger lowers the item's quantity on hand.
    ///
    /// ## Errors
    /// - `Validation` - non-positive quantity
    /// - `NotFound` - order missing/not open, or item missing/deleted
    pub async fn issue_material(
        &self,
        order_id: &str,
        item_id: &str,
        quantity: i64,
        issued_by: &str,
    ) -> DbResult<WorkOrderMaterial> {
        validate_positive("quantity", quantity)?;

        debug!(order_id = %order_id, item_id = %item_id, quantity, "Issuing material");

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let body = async {
            // Guard on a live, open order; the order number doubles as
            // the movement's document reference.
            let order_number: Option<String> = sqlx::query_scalar(
                "SELECT order_number FROM work_orders WHERE id = ?1 AND status = 'open'",
            )
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
            let order_number =
                order_number.ok_or_else(|| DbError::not_found("open work order", order_id))?;

            let item_live: i64 = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM stock_items WHERE id = ?1 AND is_deleted = 0)",
            )
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;
            if item_live == 0 {
                return Err(DbError::not_found("stock item", item_id));
            }

            let result = sqlx::query(
                r#"
                INSERT INTO work_order_materials (
                    work_order_id, item_id, quantity, issued_at, issued_by
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(order_id)
            .bind(item_id)
            .bind(quantity)
            .bind(now)
            .bind(issued_by)
            .execute(&mut *tx)
            .await?;

            let material_id = result.last_insert_rowid();

            sqlx::query(
                r#"
                INSERT INTO stock_movements (
                    item_id, kind, quantity, unit_cost,
                    document_ref, note, moved_at, moved_by
                ) VALUES (?1, ?2, ?3, 0, ?4, NULL, ?5, ?6)
                "#,
            )
            .bind(item_id)
            .bind(MovementKind::WorkOrderOut)
            .bind(quantity)
            .bind(&order_number)
            .bind(now)
            .bind(issued_by)
            .execute(&mut *tx)
            .await?;

            Ok::<i64, DbError>(material_id)
        }
        .await;

        let material_id = match body {
            Ok(id) => id,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e);
            }
        };

        tx.commit().await?;

        let material = self.get_material(material_id).await?;
        material.ok_or_else(|| {
            DbError::Internal(format!("material {} vanished after commit", material_id))
        })
    }

    /// Closes an open work order.
    pub async fn close(&self, id: &str, actor: &str) -> DbResult<()> {
        self.transition(id, actor, WorkOrderStatus::Closed).await
    }

    /// Cancels an open work order.
    pub async fn cancel(&self, id: &str, actor: &str) -> DbResult<()> {
        self.transition(id, actor, WorkOrderStatus::Cancelled).await
    }

    /// Conditional status transition: only an open order can move.
    async fn transition(&self, id: &str, actor: &str, to: WorkOrderStatus) -> DbResult<()> {
        debug!(id = %id, to = ?to, "Transitioning work order");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE work_orders SET
                status = ?2,
                closed_at = ?3,
                closed_by = ?4,
                updated_at = ?3
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(now)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("open work order", id));
        }

        Ok(())
    }

    /// Gets a work order by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<WorkOrder>> {
        let sql = format!("SELECT {} FROM work_orders WHERE id = ?1", COLUMNS);

        let order = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists open work orders, oldest first.
    pub async fn list_open(&self) -> DbResult<Vec<WorkOrder>> {
        let sql = format!(
            "SELECT {} FROM work_orders WHERE status = 'open' ORDER BY opened_at",
            COLUMNS
        );

        let orders = sqlx::query_as::<_, WorkOrder>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Gets a material line by id.
    pub async fn get_material(&self, id: i64) -> DbResult<Option<WorkOrderMaterial>> {
        let sql = format!(
            "SELECT {} FROM work_order_materials WHERE id = ?1",
            MATERIAL_COLUMNS
        );

        let material = sqlx::query_as::<_, WorkOrderMaterial>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(material)
    }

    /// Lists the material lines issued to an order.
    pub async fn materials(&self, order_id: &str) -> DbResult<Vec<WorkOrderMaterial>> {
        let sql = format!(
            "SELECT {} FROM work_order_materials WHERE work_order_id = ?1 ORDER BY id",
            MATERIAL_COLUMNS
        );

        let materials = sqlx::query_as::<_, WorkOrderMaterial>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(materials)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use almoxa_core::NewStockItem;

    async fn db_with_order_and_item() -> (Database, WorkOrder, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let order = db
            .work_orders()
            .create(NewWorkOrder {
                title: "Troca de rolamento da bomba B-3".to_string(),
                requested_by: None,
                created_by: "user-1".to_string(),
            })
            .await
            .unwrap();

        let mut item = NewStockItem::new("Rolamento 6204", "user-1");
        item.opening_quantity = 8;
        let item = db.stock().create(item).await.unwrap();

        (db, order, item.id)
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_order_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        for expected in ["OS-00001", "OS-00002", "OS-00003"] {
            let order = db
                .work_orders()
                .create(NewWorkOrder {
                    title: "Manutenção preventiva".to_string(),
                    requested_by: None,
                    created_by: "user-1".to_string(),
                })
                .await
                .unwrap();

            assert_eq!(order.order_number, expected);
            assert_eq!(order.status, WorkOrderStatus::Open);
        }

        assert_eq!(db.work_orders().list_open().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_issue_material_lowers_stock_and_logs_movement() {
        let (db, order, item_id) = db_with_order_and_item().await;

        let material = db
            .work_orders()
            .issue_material(&order.id, &item_id, 3, "user-1")
            .await
            .unwrap();

        assert_eq!(material.quantity, 3);
        assert_eq!(material.work_order_id, order.id);

        let item = db.stock().get_by_id(&item_id).await.unwrap().unwrap();
        assert_eq!(item.current_stock, 5); // 8 - 3

        let movements = db.movements().list_for_item(&item_id).await.unwrap();
        assert_eq!(movements.len(), 2);
        let issue = &movements[1];
        assert_eq!(issue.kind, MovementKind::WorkOrderOut);
        assert_eq!(issue.quantity, 3);
        assert_eq!(issue.document_ref.as_deref(), Some(order.order_number.as_str()));

        let lines = db.work_orders().materials(&order.id).await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_issue_material_guards() {
        let (db, order, item_id) = db_with_order_and_item().await;

        // Zero quantity is a validation failure, not a ledger entry.
        assert!(matches!(
            db.work_orders()
                .issue_material(&order.id, &item_id, 0, "user-1")
                .await
                .unwrap_err(),
            DbError::Validation(_)
        ));

        // Unknown order.
        assert!(matches!(
            db.work_orders()
                .issue_material("no-such-order", &item_id, 1, "user-1")
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));

        // Soft-deleted item: rejected, and the failed attempt leaves no
        // material line behind.
        db.stock().soft_delete(&item_id, "user-1").await.unwrap();
        assert!(matches!(
            db.work_orders()
                .issue_material(&order.id, &item_id, 1, "user-1")
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(db.work_orders().materials(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_order_rejects_issues_and_transitions() {
        let (db, order, item_id) = db_with_order_and_item().await;

        db.work_orders().close(&order.id, "user-1").await.unwrap();

        let closed = db.work_orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(closed.status, WorkOrderStatus::Closed);
        assert!(closed.closed_at.is_some());
        assert_eq!(closed.closed_by.as_deref(), Some("user-1"));

        // No issues against a closed order.
        assert!(matches!(
            db.work_orders()
                .issue_material(&order.id, &item_id, 1, "user-1")
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));

        // No second transition either.
        assert!(matches!(
            db.work_orders().cancel(&order.id, "user-1").await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        assert!(db.work_orders().list_open().await.unwrap().is_empty());
    }
}
