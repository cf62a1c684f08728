//! # Domain Types
//!
//! Core domain types used throughout Almoxa.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockItem     │   │ StockMovement   │   │   WorkOrder     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (auto)      │   │  id (UUID)      │       │
//! │  │  fixed_code     │   │  item_id (FK)   │   │  order_number   │       │
//! │  │  description    │   │  kind           │   │  status         │       │
//! │  │  current_stock  │   │  quantity       │   │  title          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  MovementKind   │   │ WorkOrderStatus │   │   UserAccount   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  PurchaseIn     │   │  Open           │   │  username       │       │
//! │  │  WorkOrderOut   │   │  Closed         │   │  password_hash  │       │
//! │  │  OpeningBalance │   │  Cancelled      │   │  employee_id    │       │
//! │  │  ...            │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every stock item has:
//! - `id`: UUID v4 - immutable synthetic id, used by ALL foreign references
//! - `fixed_code`: zero-padded sequence value - human-readable, immutable,
//!   never referenced by other tables
//!
//! Decoupling the two means the display code can follow its own sequence
//! while movements and work-order materials stay pinned to the synthetic id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a stock movement. The kind carries the sign: quantities are
/// stored as magnitudes and the kind decides whether the ledger entry adds
/// to or subtracts from the item's quantity on hand.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received against a purchase.
    PurchaseIn,
    /// Parts handed out on a requisition slip.
    RequisitionOut,
    /// Parts issued to a maintenance work order.
    WorkOrderOut,
    /// Manual correction raising the count.
    AdjustmentIn,
    /// Manual correction lowering the count.
    AdjustmentOut,
    /// The ledger entry that establishes an item's starting quantity.
    /// Written exactly once, by the item-creation transaction.
    OpeningBalance,
}

impl MovementKind {
    /// Returns the sign this kind applies to its quantity: `+1` for
    /// inbound kinds, `-1` for outbound kinds.
    pub const fn signum(&self) -> i64 {
        match self {
            MovementKind::PurchaseIn
            | MovementKind::AdjustmentIn
            | MovementKind::OpeningBalance => 1,
            MovementKind::RequisitionOut
            | MovementKind::WorkOrderOut
            | MovementKind::AdjustmentOut => -1,
        }
    }

    /// Whether this kind raises the quantity on hand.
    pub const fn is_inbound(&self) -> bool {
        self.signum() > 0
    }

    /// The stable string stored in the database `kind` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::PurchaseIn => "purchase_in",
            MovementKind::RequisitionOut => "requisition_out",
            MovementKind::WorkOrderOut => "work_order_out",
            MovementKind::AdjustmentIn => "adjustment_in",
            MovementKind::AdjustmentOut => "adjustment_out",
            MovementKind::OpeningBalance => "opening_balance",
        }
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// A catalogued part in the stockroom.
///
/// `current_stock` is DERIVED: it is maintained by the storage layer as the
/// signed sum of the item's movements and is never written by item
/// creation/update logic. The only way the value moves is a ledger entry.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    /// Synthetic id (UUID v4). The only value foreign keys reference.
    pub id: String,

    /// Immutable human-facing code, zero-padded to 5 digits.
    /// Assigned once by the sequence-backed code generator.
    pub fixed_code: String,

    /// Manufacturer part code (e.g., "FO-100").
    pub part_code: Option<String>,

    /// Free-form classification (e.g., "filters", "bearings").
    pub classification: Option<String>,

    /// Required display description.
    pub description: String,

    /// Where/how the part is applied.
    pub application: Option<String>,

    /// Manufacturer name.
    pub manufacturer: Option<String>,

    /// Quantity on hand. Derived from the movement ledger.
    pub current_stock: i64,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Historical record of the declared opening quantity. Plays no
    /// further part after creation.
    pub initial_stock: i64,

    /// Date the part entered the market, if known.
    pub launched_on: Option<NaiveDate>,

    /// Audit: creation.
    pub created_at: DateTime<Utc>,
    pub created_by: String,

    /// Audit: last cadastral update.
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,

    /// Audit: soft delete. Set at most once.
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,

    /// Soft-delete flag. Rows are never physically removed.
    pub is_deleted: bool,
}

impl StockItem {
    /// Whether the item sits at or below its reorder threshold.
    pub fn needs_restock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

/// Input for creating a stock item through the ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockItem {
    /// Required, non-blank after trimming.
    pub description: String,
    pub classification: Option<String>,
    pub manufacturer: Option<String>,
    pub part_code: Option<String>,
    pub application: Option<String>,
    pub launched_on: Option<NaiveDate>,
    /// Reorder threshold, >= 0. Defaults to 0.
    pub min_stock: i64,
    /// Declared opening quantity, >= 0. Defaults to 0. Recorded as
    /// `initial_stock` and as an opening-balance movement; never written
    /// into `current_stock` directly.
    pub opening_quantity: i64,
    /// Unit cost of the opening stock, >= 0.
    pub opening_unit_cost: Money,
    /// Acting user id for the audit columns.
    pub created_by: String,
}

impl NewStockItem {
    /// Minimal constructor for the common case; optional fields default
    /// to empty and numeric fields to zero.
    pub fn new(description: impl Into<String>, created_by: impl Into<String>) -> Self {
        NewStockItem {
            description: description.into(),
            classification: None,
            manufacturer: None,
            part_code: None,
            application: None,
            launched_on: None,
            min_stock: 0,
            opening_quantity: 0,
            opening_unit_cost: Money::zero(),
            created_by: created_by.into(),
        }
    }
}

/// Cadastral update for a stock item.
///
/// Deliberately has NO fields for `fixed_code`, synthetic id,
/// `current_stock`, or `initial_stock`: those are immutable or derived
/// and an update can never touch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItemUpdate {
    pub description: String,
    pub classification: Option<String>,
    pub manufacturer: Option<String>,
    pub part_code: Option<String>,
    pub application: Option<String>,
    pub launched_on: Option<NaiveDate>,
    pub min_stock: i64,
    /// Acting user id for the audit columns.
    pub updated_by: String,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One ledger entry against a stock item.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// Auto-incrementing ledger id.
    pub id: i64,

    /// Synthetic id of the owning stock item.
    pub item_id: String,

    /// Movement kind; carries the sign.
    pub kind: MovementKind,

    /// Magnitude, always >= 0. Combine with `kind.signum()` for the
    /// signed effect.
    pub quantity: i64,

    /// Unit cost in centavos at the time of the movement.
    pub unit_cost: Money,

    /// Optional document reference (invoice, requisition slip,
    /// `CAD-<fixed code>` for opening balances).
    pub document_ref: Option<String>,

    /// Free-text note.
    pub note: Option<String>,

    pub moved_at: DateTime<Utc>,
    pub moved_by: String,
}

impl StockMovement {
    /// The signed effect of this entry on the item's quantity on hand.
    pub fn signed_quantity(&self) -> i64 {
        self.kind.signum() * self.quantity
    }
}

/// Input for recording a movement against an existing item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub item_id: String,
    pub kind: MovementKind,
    /// Magnitude, >= 0.
    pub quantity: i64,
    pub unit_cost: Money,
    pub document_ref: Option<String>,
    pub note: Option<String>,
    pub moved_by: String,
}

// =============================================================================
// Employees & Users
// =============================================================================

/// An employee of the maintenance operation. Employees request work
/// orders and receive requisitioned parts; they may or may not have a
/// login (`UserAccount`).
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub role: Option<String>,
    /// Badge/registration number, unique when present.
    pub registration: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub is_deleted: bool,
}

/// A login account, linked to an employee record.
///
/// `password_hash` is an argon2 PHC string. The plaintext password never
/// leaves the creation call and must never appear in logs or error text.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub employee_id: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub is_deleted: bool,
}

/// Input for the user+employee creation transaction: one employee row and
/// one user row, inserted atomically.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub username: String,
    /// Plaintext; hashed before it touches the database.
    pub password: String,
    pub is_admin: bool,
    pub full_name: String,
    pub role: Option<String>,
    pub registration: Option<String>,
    pub created_by: String,
}

// =============================================================================
// Work Orders
// =============================================================================

/// Lifecycle status of a maintenance work order.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Accepting material issues.
    Open,
    /// Finished; no further issues allowed.
    Closed,
    /// Abandoned; no further issues allowed.
    Cancelled,
}

impl Default for WorkOrderStatus {
    fn default() -> Self {
        WorkOrderStatus::Open
    }
}

/// A maintenance work order that consumes stock via material issues.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    /// Human-facing number, `OS-` + zero-padded counter value, unique.
    pub order_number: String,
    pub title: String,
    pub status: WorkOrderStatus,
    /// Requesting employee, if any.
    pub requested_by: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed or cancelled the order.
    pub closed_by: Option<String>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Input for opening a work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkOrder {
    pub title: String,
    pub requested_by: Option<String>,
    pub created_by: String,
}

/// A material line on a work order: which item was issued, how much, by
/// whom. Mirrored by a `work_order_out` movement in the ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderMaterial {
    pub id: i64,
    pub work_order_id: String,
    pub item_id: String,
    pub quantity: i64,
    pub issued_at: DateTime<Utc>,
    pub issued_by: String,
}

// =============================================================================
// Id Generation
// =============================================================================

/// Generates a new synthetic id (UUID v4).
///
/// ## Usage
/// ```rust
/// let id = almoxa_core::generate_id();
/// assert_eq!(id.len(), 36);
/// ```
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_kind_signs() {
        assert_eq!(MovementKind::PurchaseIn.signum(), 1);
        assert_eq!(MovementKind::AdjustmentIn.signum(), 1);
        assert_eq!(MovementKind::OpeningBalance.signum(), 1);
        assert_eq!(MovementKind::RequisitionOut.signum(), -1);
        assert_eq!(MovementKind::WorkOrderOut.signum(), -1);
        assert_eq!(MovementKind::AdjustmentOut.signum(), -1);
    }

    #[test]
    fn test_movement_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&MovementKind::OpeningBalance).unwrap();
        assert_eq!(json, "\"opening_balance\"");

        let kind: MovementKind = serde_json::from_str("\"work_order_out\"").unwrap();
        assert_eq!(kind, MovementKind::WorkOrderOut);
    }

    #[test]
    fn test_movement_kind_as_str_matches_serde() {
        for kind in [
            MovementKind::PurchaseIn,
            MovementKind::RequisitionOut,
            MovementKind::WorkOrderOut,
            MovementKind::AdjustmentIn,
            MovementKind::AdjustmentOut,
            MovementKind::OpeningBalance,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = UserAccount {
            id: generate_id(),
            username: "almir".to_string(),
            password_hash: "$argon2id$...secret...".to_string(),
            employee_id: None,
            is_admin: false,
            created_at: Utc::now(),
            created_by: "system".to_string(),
            updated_at: Utc::now(),
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
            is_deleted: false,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
    }
}
