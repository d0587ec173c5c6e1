//! Read-only views over pool usage.

use serde::{Deserialize, Serialize};

use crate::checkout::Checkout;

/// Summary of a single pool's capacity accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Pool name.
    pub name: String,
    /// Total capacity in units.
    pub total: u32,
    /// Sum of quantities across all active checkouts.
    pub in_use: u32,
    /// Units available for checkout (total - in_use).
    pub available: u32,
}

/// Detailed usage view of a single pool, including its active checkouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUsage {
    /// Pool name.
    pub name: String,
    /// Total capacity in units.
    pub total: u32,
    /// Sum of quantities across all active checkouts.
    pub in_use: u32,
    /// Units available for checkout (total - in_use).
    pub available: u32,
    /// Active checkouts against this pool.
    pub checkouts: Vec<Checkout>,
}
