//! # almoxa-db: Database Layer for Almoxa
//!
//! This crate provides database access for the Almoxa stockroom system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Almoxa Data Flow                                 │
//! │                                                                         │
//! │  Bridge call (create stock item)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     almoxa-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (stock.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StockRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ MovementRepo  │    │ 002_fts.sql  │  │   │
//! │  │   │ Management    │    │ UserRepo      │    │              │  │   │
//! │  │   └───────────────┘    │ WorkOrderRepo │    └──────────────┘  │   │
//! │  │          ▲             └───────────────┘                       │   │
//! │  │   ┌──────┴────────┐                                            │   │
//! │  │   │  codes.rs     │  sequence-backed code generator            │   │
//! │  │   └───────────────┘                                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL, foreign keys ON, ledger trigger)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`codes`] - Sequence-backed fixed-code / order-number generator
//! - [`error`] - The storage error taxonomy
//! - [`repository`] - Repository implementations (stock, movement, user,
//!   work order)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use almoxa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/almoxa.db")).await?;
//!
//! let item = db.stock().create(new_item).await?;
//! let hits = db.stock().search("filtro", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codes;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::movement::MovementRepository;
pub use repository::stock::StockRepository;
pub use repository::user::UserRepository;
pub use repository::work_order::WorkOrderRepository;
