//! Persistence collaborator for the license ledger.
//!
//! The ledger owns the in-memory truth; a [`LedgerStore`] provides
//! startup hydration and durable writes. Writes are awaited inside the
//! ledger's locked critical section, so an operation reports success
//! only after the store accepted the write.

pub mod memory;

use async_trait::async_trait;

use licman_core::result::AppResult;
use licman_core::types::CheckoutId;
use licman_entity::checkout::Checkout;
use licman_entity::pool::LicensePool;

pub use memory::MemoryStore;

/// Trait for the durable backing store of the ledger.
///
/// Implementations must be thread-safe. A failed write must leave the
/// store unchanged; the ledger aborts the operation and surfaces the
/// error, leaving its own state untouched as well.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug {
    /// Load all pools at startup.
    async fn load_pools(&self) -> AppResult<Vec<LicensePool>>;

    /// Load all active checkouts at startup.
    async fn load_checkouts(&self) -> AppResult<Vec<Checkout>>;

    /// Persist a newly created pool.
    async fn insert_pool(&self, pool: &LicensePool) -> AppResult<()>;

    /// Persist a newly granted checkout.
    async fn insert_checkout(&self, checkout: &Checkout) -> AppResult<()>;

    /// Remove a released checkout.
    async fn remove_checkout(&self, id: CheckoutId) -> AppResult<()>;
}
