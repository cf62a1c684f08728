//! # Database Error Types
//!
//! The storage error taxonomy for Almoxa.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Constraint codes become domain errors         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IPC bridge ← Forwards the Display message                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Frontend displays the human-readable message                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error raised inside a transaction triggers a rollback before it
//! propagates; no error is swallowed anywhere in this crate. Persisted
//! payloads (passwords above all) never appear in error text.

use thiserror::Error;

use almoxa_core::ValidationError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Caller-supplied data failed a precondition. Raised before any SQL
    /// runs, so no transaction is ever opened for invalid input.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Target row missing or soft-deleted.
    ///
    /// ## When This Occurs
    /// - Update/delete against an unknown synthetic id
    /// - Update against a soft-deleted row
    /// - Movement against a soft-deleted item
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Soft-delete against a row that is already flagged deleted.
    /// Distinguished from NotFound so the caller can report it precisely;
    /// a second delete never writes a second deletion timestamp.
    #[error("{entity} already deleted: {id}")]
    AlreadyDeleted { entity: String, id: String },

    /// The business-key invariant was violated: another non-deleted item
    /// already carries this (part code, description, manufacturer) triple.
    #[error("stock item already exists: '{description}' ({part_code} / {manufacturer})")]
    DuplicateItem {
        part_code: String,
        description: String,
        manufacturer: String,
    },

    /// The generated fixed code already exists.
    ///
    /// ## Why This Is Fatal
    /// The counter advance and the insert happen in one transaction, so a
    /// collision means the sequence and the table disagree — a manual
    /// insert outside the normal path, or a counter reset. Never retried
    /// silently; it must be surfaced and investigated.
    #[error("fixed code conflict: '{code}' is already assigned")]
    CodeConflict { code: String },

    /// Unique constraint violation outside the stock identity index
    /// (username, badge registration, order number).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent synthetic id
    /// - A restrictive FK blocking a physical delete
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (unrecognized storage error; the driver's
    /// message passes through unchanged).
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Internal consistency error (e.g., a just-committed row cannot be
    /// read back). Indicates a bug, not bad input.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an AlreadyDeleted error.
    pub fn already_deleted(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::AlreadyDeleted {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the failure is a connection/pool fault a caller could
    /// reasonably retry. The core never retries on its own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io             → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
///
/// SQLite reports unique violations as `UNIQUE constraint failed:
/// <table>.<column>` for column indexes and `UNIQUE constraint failed:
/// index 'name'` for expression indexes (the stock identity index is the
/// latter). Repositories that know the statement's context refine the
/// generic `UniqueViolation` into `DuplicateItem`/`CodeConflict`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
