//! # licman-ledger
//!
//! The License Ledger: a concurrent checkout/release manager for
//! finite-capacity license pools.
//!
//! ## Modules
//!
//! - `ledger` — the pool registry and the five ledger operations
//! - `store` — the persistence collaborator trait and the bundled
//!   in-memory implementation
//!
//! The ledger is a library-level component: transport and durable
//! persistence are external collaborators. All capacity-affecting
//! operations are serialized per pool, so the invariant "sum of active
//! checkout quantities ≤ pool total" holds at every point in time.

pub mod ledger;
pub mod store;

pub use ledger::LicenseLedger;
pub use store::{LedgerStore, MemoryStore};
