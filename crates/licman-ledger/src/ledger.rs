//! The License Ledger: pool registry and checkout/release operations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use licman_core::config::ledger::LedgerConfig;
use licman_core::error::{AppError, ErrorKind};
use licman_core::result::AppResult;
use licman_core::types::CheckoutId;
use licman_entity::checkout::{Checkout, CheckoutKey};
use licman_entity::pool::LicensePool;
use licman_entity::usage::{PoolStatus, PoolUsage};

use crate::store::LedgerStore;

/// A pool together with its active checkouts and in-use counter.
///
/// Invariant: `in_use` equals the sum of `checkouts` quantities and never
/// exceeds `pool.total`.
#[derive(Debug)]
struct PoolEntry {
    /// The pool record.
    pool: LicensePool,
    /// Units currently held across all active checkouts.
    in_use: u32,
    /// Active checkouts against this pool.
    checkouts: Vec<Checkout>,
}

impl PoolEntry {
    fn new(pool: LicensePool) -> Self {
        Self {
            pool,
            in_use: 0,
            checkouts: Vec::new(),
        }
    }

    fn status(&self) -> PoolStatus {
        PoolStatus {
            name: self.pool.name.clone(),
            total: self.pool.total,
            in_use: self.in_use,
            available: self.pool.total - self.in_use,
        }
    }
}

/// Concurrent ledger of license pools and active checkouts.
///
/// Locking is per pool: the outer registry lock is write-held only while
/// registering a pool, and each pool's mutex serializes every
/// capacity-affecting operation on that pool, including the awaited
/// durable write. Operations on different pools do not block each other.
#[derive(Debug)]
pub struct LicenseLedger {
    /// Pool registry, keyed by pool name.
    pools: RwLock<HashMap<String, Arc<Mutex<PoolEntry>>>>,
    /// Durable backing store.
    store: Arc<dyn LedgerStore>,
}

impl LicenseLedger {
    /// Create an empty ledger on top of the given store.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Hydrate a ledger from the store's persisted pools and checkouts.
    ///
    /// Persisted state that violates the ledger invariants (a checkout
    /// against an unknown pool, a duplicate checkout tuple, or an
    /// overcommitted pool) is rejected with a `Storage` error rather than
    /// silently repaired.
    pub async fn load(store: Arc<dyn LedgerStore>) -> AppResult<Self> {
        let pools = store.load_pools().await?;
        let checkouts = store.load_checkouts().await?;

        let mut entries: HashMap<String, PoolEntry> = HashMap::new();
        for pool in pools {
            let name = pool.name.clone();
            if entries.insert(name.clone(), PoolEntry::new(pool)).is_some() {
                return Err(AppError::storage(format!(
                    "store contains two pools named '{name}'"
                )));
            }
        }

        for checkout in checkouts {
            let entry = entries.get_mut(&checkout.license_name).ok_or_else(|| {
                AppError::storage(format!(
                    "checkout {} references unknown pool '{}'",
                    checkout.id, checkout.license_name
                ))
            })?;
            if entry.checkouts.iter().any(|c| c.matches(&checkout.key())) {
                return Err(AppError::storage(format!(
                    "store contains duplicate checkout tuple for pool '{}'",
                    checkout.license_name
                )));
            }
            let in_use = entry
                .in_use
                .checked_add(checkout.quantity)
                .filter(|&total| total <= entry.pool.total)
                .ok_or_else(|| {
                    AppError::storage(format!(
                        "persisted checkouts overcommit pool '{}' (total {})",
                        checkout.license_name, entry.pool.total
                    ))
                })?;
            entry.in_use = in_use;
            entry.checkouts.push(checkout);
        }

        info!(pools = entries.len(), "License ledger hydrated from store");

        let map = entries
            .into_iter()
            .map(|(name, entry)| (name, Arc::new(Mutex::new(entry))))
            .collect();

        Ok(Self {
            pools: RwLock::new(map),
            store,
        })
    }

    /// Register the pools declared in configuration.
    ///
    /// Seed entries whose name is already registered are skipped; any
    /// other failure (invalid capacity, store write) is propagated.
    pub async fn seed(&self, config: &LedgerConfig) -> AppResult<()> {
        for seed in &config.seed_pools {
            match self.create_pool(&seed.name, seed.total).await {
                Ok(_) => {}
                Err(err) if err.kind == ErrorKind::DuplicateName => {
                    debug!(pool = %seed.name, "Seed pool already registered, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Register a new license pool.
    ///
    /// No side effect on failure: the pool becomes visible only after the
    /// store accepted the write.
    pub async fn create_pool(&self, name: &str, total: i64) -> AppResult<LicensePool> {
        if name.is_empty() {
            return Err(AppError::validation("pool name must be non-empty"));
        }
        let total = u32::try_from(total).map_err(|_| {
            AppError::invalid_capacity(format!(
                "pool capacity must be a non-negative 32-bit integer, got {total}"
            ))
        })?;

        let mut pools = self.pools.write().await;
        if pools.contains_key(name) {
            return Err(AppError::duplicate_name(format!(
                "a pool named '{name}' already exists"
            )));
        }

        let pool = LicensePool::new(name, total);
        self.store.insert_pool(&pool).await?;
        pools.insert(name.to_string(), Arc::new(Mutex::new(PoolEntry::new(pool.clone()))));

        info!(pool = %name, total, "License pool created");
        Ok(pool)
    }

    /// Reserve `quantity` units of the named pool for a user on a host.
    ///
    /// The capacity check and the reservation are a single atomic step
    /// under the pool's mutex; two racing checkouts can never jointly
    /// overcommit the pool.
    pub async fn checkout(
        &self,
        user_name: &str,
        lead_host: &str,
        license_name: &str,
        quantity: i64,
    ) -> AppResult<Checkout> {
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q > 0 => q,
            _ => {
                return Err(AppError::invalid_quantity(format!(
                    "checkout quantity must be a positive 32-bit integer, got {quantity}"
                )));
            }
        };

        let entry = self.entry(license_name).await?;
        let mut entry = entry.lock().await;

        let key = CheckoutKey::new(quantity, user_name, lead_host, license_name);
        if entry.checkouts.iter().any(|c| c.matches(&key)) {
            return Err(AppError::duplicate_checkout(format!(
                "user '{user_name}' on host '{lead_host}' already holds {quantity} units of '{license_name}'"
            )));
        }

        let free = entry.pool.total - entry.in_use;
        if quantity > free {
            debug!(
                pool = %license_name,
                requested = quantity,
                free,
                "Checkout denied, insufficient capacity"
            );
            return Err(AppError::capacity_exceeded(format!(
                "pool '{license_name}' has {free} of {} units free, requested {quantity}",
                entry.pool.total
            )));
        }

        let checkout = Checkout::new(quantity, user_name, lead_host, license_name);
        self.store.insert_checkout(&checkout).await?;

        entry.in_use += quantity;
        entry.checkouts.push(checkout.clone());

        info!(
            pool = %license_name,
            user = %user_name,
            host = %lead_host,
            quantity,
            in_use = entry.in_use,
            "License checked out"
        );
        Ok(checkout)
    }

    /// Release the active checkout matching the given tuple.
    ///
    /// Releases are not idempotent: releasing a tuple that has no active
    /// match (including a second release of the same checkout) fails with
    /// `CheckoutNotFound`.
    pub async fn release(&self, key: &CheckoutKey) -> AppResult<Checkout> {
        let Some(entry) = self.lookup(&key.license_name).await else {
            return Err(Self::no_match(key));
        };
        let mut entry = entry.lock().await;

        let Some(index) = entry.checkouts.iter().position(|c| c.matches(key)) else {
            return Err(Self::no_match(key));
        };

        self.store.remove_checkout(entry.checkouts[index].id).await?;

        let checkout = entry.checkouts.swap_remove(index);
        entry.in_use -= checkout.quantity;

        info!(
            pool = %checkout.license_name,
            user = %checkout.user_name,
            host = %checkout.lead_host,
            quantity = checkout.quantity,
            in_use = entry.in_use,
            "License released"
        );
        Ok(checkout)
    }

    /// Release the active checkout with the given identifier.
    pub async fn release_by_id(&self, id: CheckoutId) -> AppResult<Checkout> {
        let entries: Vec<Arc<Mutex<PoolEntry>>> =
            self.pools.read().await.values().cloned().collect();

        for entry in entries {
            let mut entry = entry.lock().await;
            if let Some(index) = entry.checkouts.iter().position(|c| c.id == id) {
                self.store.remove_checkout(id).await?;

                let checkout = entry.checkouts.swap_remove(index);
                entry.in_use -= checkout.quantity;

                info!(
                    pool = %checkout.license_name,
                    checkout_id = %id,
                    quantity = checkout.quantity,
                    in_use = entry.in_use,
                    "License released"
                );
                return Ok(checkout);
            }
        }

        Err(AppError::checkout_not_found(format!(
            "no active checkout with id {id}"
        )))
    }

    /// Detailed usage of one pool: capacity, units in use, and the active
    /// checkouts. Pure read.
    pub async fn usage(&self, license_name: &str) -> AppResult<PoolUsage> {
        let entry = self.entry(license_name).await?;
        let entry = entry.lock().await;
        let status = entry.status();
        Ok(PoolUsage {
            name: status.name,
            total: status.total,
            in_use: status.in_use,
            available: status.available,
            checkouts: entry.checkouts.clone(),
        })
    }

    /// Capacity summary of every registered pool, sorted by name.
    pub async fn list_pools(&self) -> Vec<PoolStatus> {
        let entries: Vec<Arc<Mutex<PoolEntry>>> =
            self.pools.read().await.values().cloned().collect();

        let mut statuses = Vec::with_capacity(entries.len());
        for entry in entries {
            statuses.push(entry.lock().await.status());
        }
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Look up a pool entry, failing with `UnknownPool` if absent.
    async fn entry(&self, license_name: &str) -> AppResult<Arc<Mutex<PoolEntry>>> {
        self.lookup(license_name).await.ok_or_else(|| {
            AppError::unknown_pool(format!("no pool named '{license_name}'"))
        })
    }

    async fn lookup(&self, license_name: &str) -> Option<Arc<Mutex<PoolEntry>>> {
        self.pools.read().await.get(license_name).cloned()
    }

    fn no_match(key: &CheckoutKey) -> AppError {
        AppError::checkout_not_found(format!(
            "no active checkout of {} units of '{}' by user '{}' on host '{}'",
            key.quantity, key.license_name, key.user_name, key.lead_host
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> LicenseLedger {
        LicenseLedger::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_pool_rejects_negative_capacity() {
        let ledger = ledger();
        let err = ledger.create_pool("matlab", -1).await.expect_err("negative");
        assert_eq!(err.kind, ErrorKind::InvalidCapacity);
        assert!(ledger.list_pools().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_pool_rejects_empty_name() {
        let ledger = ledger();
        let err = ledger.create_pool("", 5).await.expect_err("empty name");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_pool_accepts_zero_capacity() {
        let ledger = ledger();
        let pool = ledger.create_pool("matlab", 0).await.expect("zero is valid");
        assert_eq!(pool.total, 0);

        let err = ledger
            .checkout("alice", "node01", "matlab", 1)
            .await
            .expect_err("nothing to check out");
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
    }

    #[tokio::test]
    async fn test_duplicate_pool_name_rejected() {
        let ledger = ledger();
        ledger.create_pool("matlab", 5).await.expect("first");
        let err = ledger.create_pool("matlab", 9).await.expect_err("second");
        assert_eq!(err.kind, ErrorKind::DuplicateName);

        // The failed creation must not have touched the registered pool.
        let usage = ledger.usage("matlab").await.expect("usage");
        assert_eq!(usage.total, 5);
    }

    #[tokio::test]
    async fn test_seed_skips_registered_pools() {
        use licman_core::config::ledger::{LedgerConfig, SeedPool};

        let ledger = ledger();
        ledger.create_pool("matlab", 5).await.expect("create");

        let config = LedgerConfig {
            seed_pools: vec![
                SeedPool {
                    name: "matlab".to_string(),
                    total: 99,
                },
                SeedPool {
                    name: "abaqus".to_string(),
                    total: 10,
                },
            ],
        };
        ledger.seed(&config).await.expect("seed");

        let pools = ledger.list_pools().await;
        assert_eq!(pools.len(), 2);
        // The existing pool keeps its original capacity.
        assert_eq!(pools[1].name, "matlab");
        assert_eq!(pools[1].total, 5);
        assert_eq!(pools[0].name, "abaqus");
        assert_eq!(pools[0].total, 10);
    }

    #[tokio::test]
    async fn test_seed_propagates_invalid_capacity() {
        use licman_core::config::ledger::{LedgerConfig, SeedPool};

        let ledger = ledger();
        let config = LedgerConfig {
            seed_pools: vec![SeedPool {
                name: "broken".to_string(),
                total: -3,
            }],
        };
        let err = ledger.seed(&config).await.expect_err("negative seed");
        assert_eq!(err.kind, ErrorKind::InvalidCapacity);
    }
}
