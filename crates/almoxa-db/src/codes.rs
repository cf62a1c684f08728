//! # Sequence-Backed Code Generator
//!
//! Produces the human-readable identifiers: the 5-digit fixed code for
//! stock items and the `OS-` order number for work orders.
//!
//! ## How Allocation Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Code Allocation (inside ONE transaction)                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  INSERT INTO counters ... ON CONFLICT DO UPDATE                        │
//! │    SET value = value + 1 RETURNING value      ← atomic read-and-advance │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  format 42 → "00042"                                                   │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  defensive existence check + INSERT the row claiming the code          │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Advancing the counter and claiming the code are never observable as   │
//! │  separate steps by two concurrent creators: both happen inside the     │
//! │  single transaction, on the single connection, that inserts the row.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A generated code that turns out to be taken anyway means the sequence
//! and the table disagree (manual insert outside the normal path, counter
//! reset). That is `DbError::CodeConflict` and is never retried.

use sqlx::SqliteConnection;

use crate::error::DbResult;

/// Width of the zero-padded stock item fixed code.
pub const FIXED_CODE_WIDTH: usize = 5;

/// Counter row backing stock item fixed codes.
const STOCK_ITEM_SEQUENCE: &str = "stock_item_code";

/// Counter row backing work order numbers.
const WORK_ORDER_SEQUENCE: &str = "work_order_number";

/// Atomically advances the named counter and returns the new value.
///
/// Runs on the caller's connection, which MUST be inside an open
/// transaction when the value is about to be claimed as an identifier.
/// The upsert creates the counter row lazily on first use.
pub async fn next_sequence_value(conn: &mut SqliteConnection, name: &str) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO counters (name, value)
        VALUES (?1, 1)
        ON CONFLICT (name) DO UPDATE SET value = value + 1
        RETURNING value
        "#,
    )
    .bind(name)
    .fetch_one(conn)
    .await?;

    Ok(value)
}

/// Formats a counter value as a fixed code: decimal, left-padded with
/// zeros to [`FIXED_CODE_WIDTH`].
///
/// Values wider than the pad width keep all their digits; the catalog
/// would have to pass 99999 items first.
pub fn format_fixed_code(value: i64) -> String {
    format!("{:0width$}", value, width = FIXED_CODE_WIDTH)
}

/// Allocates the next stock item fixed code on the caller's open
/// transaction.
pub async fn next_fixed_code(conn: &mut SqliteConnection) -> DbResult<String> {
    let value = next_sequence_value(conn, STOCK_ITEM_SEQUENCE).await?;
    Ok(format_fixed_code(value))
}

/// Allocates the next work order number on the caller's open transaction.
/// Format: `OS-` + the counter value zero-padded to 5.
pub async fn next_order_number(conn: &mut SqliteConnection) -> DbResult<String> {
    let value = next_sequence_value(conn, WORK_ORDER_SEQUENCE).await?;
    Ok(format!("OS-{:0width$}", value, width = FIXED_CODE_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_format_fixed_code_pads_to_width() {
        assert_eq!(format_fixed_code(1), "00001");
        assert_eq!(format_fixed_code(42), "00042");
        assert_eq!(format_fixed_code(99999), "99999");
        assert_eq!(format_fixed_code(100000), "100000");
    }

    #[tokio::test]
    async fn test_codes_are_strictly_increasing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut tx = db.pool().begin().await.unwrap();

        let mut previous = String::new();
        for _ in 0..10 {
            let code = next_fixed_code(&mut tx).await.unwrap();
            assert_eq!(code.len(), FIXED_CODE_WIDTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(code > previous);
            previous = code;
        }

        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_sequences_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut tx = db.pool().begin().await.unwrap();

        let code = next_fixed_code(&mut tx).await.unwrap();
        let order = next_order_number(&mut tx).await.unwrap();

        // Each sequence starts at 1, regardless of the other.
        assert_eq!(code, "00001");
        assert_eq!(order, "OS-00001");

        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_releases_counter_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let first = next_fixed_code(&mut tx).await.unwrap();
        tx.rollback().await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let second = next_fixed_code(&mut tx).await.unwrap();
        tx.commit().await.unwrap();

        // The advance rolled back with the transaction, so the value is
        // handed out again. Gap-free numbering under rollback.
        assert_eq!(first, second);
    }
}
