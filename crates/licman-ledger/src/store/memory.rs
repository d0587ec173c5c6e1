//! In-memory ledger store using a Tokio mutex for single-node deployments.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use licman_core::error::AppError;
use licman_core::result::AppResult;
use licman_core::types::CheckoutId;
use licman_entity::checkout::Checkout;
use licman_entity::pool::LicensePool;

use super::LedgerStore;

/// Internal state of the memory store.
#[derive(Debug, Default)]
struct InnerState {
    /// All known pools.
    pools: Vec<LicensePool>,
    /// All active checkouts.
    checkouts: Vec<Checkout>,
}

/// In-memory [`LedgerStore`] with no durability.
///
/// Suitable for tests and deployments that accept losing ledger state on
/// restart. Also the seed for hydration tests: construct it pre-populated
/// with [`MemoryStore::with_state`] and hand it to `LicenseLedger::load`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Protected inner state.
    state: Mutex<InnerState>,
}

impl MemoryStore {
    /// Creates an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory store pre-populated with the given state.
    pub fn with_state(pools: Vec<LicensePool>, checkouts: Vec<Checkout>) -> Self {
        Self {
            state: Mutex::new(InnerState { pools, checkouts }),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load_pools(&self) -> AppResult<Vec<LicensePool>> {
        let state = self.state.lock().await;
        Ok(state.pools.clone())
    }

    async fn load_checkouts(&self) -> AppResult<Vec<Checkout>> {
        let state = self.state.lock().await;
        Ok(state.checkouts.clone())
    }

    async fn insert_pool(&self, pool: &LicensePool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.pools.iter().any(|p| p.name == pool.name) {
            return Err(AppError::storage(format!(
                "pool '{}' already persisted",
                pool.name
            )));
        }
        state.pools.push(pool.clone());
        Ok(())
    }

    async fn insert_checkout(&self, checkout: &Checkout) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.checkouts.iter().any(|c| c.id == checkout.id) {
            return Err(AppError::storage(format!(
                "checkout {} already persisted",
                checkout.id
            )));
        }
        state.checkouts.push(checkout.clone());
        Ok(())
    }

    async fn remove_checkout(&self, id: CheckoutId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.checkouts.len();
        state.checkouts.retain(|c| c.id != id);
        if state.checkouts.len() == before {
            // The ledger only removes checkouts it granted, so a miss here
            // means the store drifted from the ledger.
            warn!(checkout_id = %id, "Removed checkout was not in the store");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_load_round_trip() {
        let store = MemoryStore::new();
        let pool = LicensePool::new("matlab", 10);
        store.insert_pool(&pool).await.expect("insert pool");

        let checkout = Checkout::new(3, "alice", "node01", "matlab");
        store
            .insert_checkout(&checkout)
            .await
            .expect("insert checkout");

        assert_eq!(store.load_pools().await.expect("load pools"), vec![pool]);
        assert_eq!(
            store.load_checkouts().await.expect("load checkouts"),
            vec![checkout]
        );
    }

    #[tokio::test]
    async fn test_duplicate_pool_insert_rejected() {
        let store = MemoryStore::new();
        let pool = LicensePool::new("matlab", 10);
        store.insert_pool(&pool).await.expect("first insert");
        let err = store.insert_pool(&pool).await.expect_err("second insert");
        assert_eq!(err.kind, licman_core::error::ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_remove_checkout_clears_it() {
        let store = MemoryStore::new();
        let checkout = Checkout::new(1, "bob", "node02", "abaqus");
        store.insert_checkout(&checkout).await.expect("insert");
        store.remove_checkout(checkout.id).await.expect("remove");
        assert!(store.load_checkouts().await.expect("load").is_empty());
    }
}
