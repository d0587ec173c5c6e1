//! License pool entity model.

use serde::{Deserialize, Serialize};

/// A named license pool with a fixed total capacity.
///
/// The name is the logical join key: checkouts reference their pool by
/// name, never by a surrogate id. Capacity is fixed at creation; there
/// is no resize or delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePool {
    /// Unique, non-empty pool name.
    pub name: String,
    /// Total capacity in interchangeable units.
    pub total: u32,
}

impl LicensePool {
    /// Create a new pool record.
    pub fn new(name: impl Into<String>, total: u32) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}
