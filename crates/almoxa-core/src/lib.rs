//! # almoxa-core: Pure Domain Logic for Almoxa
//!
//! Almoxa is a stockroom (almoxarifado) ledger for maintenance operations:
//! a parts catalog, a movement ledger that derives every quantity on hand,
//! and the employees/users/work-orders around them. This crate is the pure
//! half of the system — no I/O ever happens here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Almoxa Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Desktop shell (out of scope)                    │   │
//! │  │    Catalog UI ──► Movement UI ──► Work-order UI                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC bridge                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ almoxa-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────────┐              │   │
//! │  │   │   types   │  │   money   │  │  validation   │              │   │
//! │  │   │ StockItem │  │   Money   │  │    rules      │              │   │
//! │  │   │ Movement  │  │ centavos  │  │    checks     │              │   │
//! │  │   └───────────┘  └───────────┘  └───────────────┘              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 almoxa-db (Database Layer)                      │   │
//! │  │      SQLite queries, migrations, ledger transaction             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockItem, StockMovement, WorkOrder, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use almoxa_core::StockItem` instead of
// `use almoxa_core::types::StockItem`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a stock item description.
///
/// ## Business Reason
/// Keeps catalog rows displayable in a single table line and guards
/// against paste accidents from supplier spreadsheets.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Maximum length of a free-text search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Minimum length of a user account password before hashing.
pub const MIN_PASSWORD_LEN: usize = 6;
