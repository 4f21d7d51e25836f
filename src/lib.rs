//! # Tripledger Core
//!
//! A shared-trip expense ledger: participants join a trip via a short code,
//! contribute money toward a collective budget, log expenses, and see live
//! per-member balances.
//!
//! ## Features
//!
//! - **Reconciliation engine**: a pure, idempotent `recompute` pass that
//!   derives every member's expected contribution, personal credit, expense
//!   share, and net balance from the raw ledger
//! - **Trip service**: member joins, contributions, expenses, reimbursements,
//!   refunds, and budget edits, each persisted through one recompute cycle
//! - **Approval queues**: pending join, expense, contribution, deletion, and
//!   budget-increase requests that stay inert until resolved
//! - **Override flags**: per-member freezes for expected contribution,
//!   personal credit, and balance
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage
//!
//! ## Quick Start
//!
//! ```rust
//! use tripledger_core::{NewTrip, TripService};
//! use tripledger_core::utils::MemoryTripStore;
//!
//! // The service works against any TripStorage implementation.
//! // let mut service = TripService::new(MemoryTripStore::new());
//! ```

pub mod reconciliation;
pub mod traits;
pub mod trip;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::{recompute, round2};
pub use traits::*;
pub use trip::*;
pub use types::*;
