//! # licman-entity
//!
//! Domain entity models for the Licman license ledger.

pub mod checkout;
pub mod pool;
pub mod usage;

pub use checkout::{Checkout, CheckoutKey};
pub use pool::LicensePool;
pub use usage::{PoolStatus, PoolUsage};
