//! # Repository Layer
//!
//! Repository implementations for database access.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  Bridge call                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.stock() ──► StockRepository ──► SQL ──► StockItem                  │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL isolated in one place per entity                                │
//! │  • Multi-statement writes own their transaction span                   │
//! │  • Constraint violations mapped to domain errors at the source         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`stock`] - Parts catalog: the ledger transaction, updates, soft
//!   deletes, search
//! - [`movement`] - The stock movement ledger
//! - [`user`] - User accounts and employees
//! - [`work_order`] - Maintenance work orders and material issues

pub mod movement;
pub mod stock;
pub mod user;
pub mod work_order;
