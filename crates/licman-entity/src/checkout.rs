//! License checkout entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licman_core::types::CheckoutId;

/// A held allocation of some quantity of a pool's units.
///
/// Checkouts are immutable: changing quantity, user, or host requires a
/// release followed by a new checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// Unique checkout identifier.
    pub id: CheckoutId,
    /// Units held, always positive.
    pub quantity: u32,
    /// User who holds the checkout.
    pub user_name: String,
    /// Host from which the checkout was made.
    pub lead_host: String,
    /// Name of the pool this checkout draws from.
    pub license_name: String,
    /// When the units were checked out.
    pub checked_out_at: DateTime<Utc>,
}

impl Checkout {
    /// Create a new checkout record with a fresh identifier.
    pub fn new(
        quantity: u32,
        user_name: impl Into<String>,
        lead_host: impl Into<String>,
        license_name: impl Into<String>,
    ) -> Self {
        Self {
            id: CheckoutId::new(),
            quantity,
            user_name: user_name.into(),
            lead_host: lead_host.into(),
            license_name: license_name.into(),
            checked_out_at: Utc::now(),
        }
    }

    /// The uniqueness tuple of this checkout.
    pub fn key(&self) -> CheckoutKey {
        CheckoutKey {
            quantity: self.quantity,
            user_name: self.user_name.clone(),
            lead_host: self.lead_host.clone(),
            license_name: self.license_name.clone(),
        }
    }

    /// Whether this checkout matches the given uniqueness tuple.
    pub fn matches(&self, key: &CheckoutKey) -> bool {
        self.quantity == key.quantity
            && self.user_name == key.user_name
            && self.lead_host == key.lead_host
            && self.license_name == key.license_name
    }
}

/// The (quantity, user, host, license) tuple that is unique among active
/// checkouts.
///
/// The constraint is deliberately weak: the same user and host may hold
/// two active checkouts of *different* quantities against one pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutKey {
    /// Units held.
    pub quantity: u32,
    /// User who holds the checkout.
    pub user_name: String,
    /// Host from which the checkout was made.
    pub lead_host: String,
    /// Name of the pool the checkout draws from.
    pub license_name: String,
}

impl CheckoutKey {
    /// Create a new uniqueness tuple.
    pub fn new(
        quantity: u32,
        user_name: impl Into<String>,
        lead_host: impl Into<String>,
        license_name: impl Into<String>,
    ) -> Self {
        Self {
            quantity,
            user_name: user_name.into(),
            lead_host: lead_host.into(),
            license_name: license_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let checkout = Checkout::new(4, "alice", "node01", "matlab");
        let key = checkout.key();
        assert!(checkout.matches(&key));
        assert_eq!(key, CheckoutKey::new(4, "alice", "node01", "matlab"));
    }

    #[test]
    fn test_distinct_quantities_are_distinct_keys() {
        let a = CheckoutKey::new(4, "alice", "node01", "matlab");
        let b = CheckoutKey::new(5, "alice", "node01", "matlab");
        assert_ne!(a, b);
    }
}
