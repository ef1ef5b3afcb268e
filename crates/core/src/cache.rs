//! Balance caching using Moka.
//!
//! Read-through only: a miss is always answered from the ledger, and every
//! post or void clears the whole cache. Cached values are never the canonical
//! balance.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use petledger_shared::types::{AccountId, Money};

use crate::ledger::BranchFilter;

/// Default cache capacity (number of balances).
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key: one account's balance at one instant under one branch filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceKey {
    /// Account.
    pub account_id: AccountId,
    /// Cut-off in epoch milliseconds.
    pub as_of_millis: i64,
    /// Branch filter.
    pub branch: BranchFilter,
}

impl BalanceKey {
    /// Builds a key.
    #[must_use]
    pub fn new(account_id: AccountId, as_of: DateTime<Utc>, branch: BranchFilter) -> Self {
        Self {
            account_id,
            as_of_millis: as_of.timestamp_millis(),
            branch,
        }
    }
}

/// Cache for derived account balances.
///
/// Thread-safe; clones share the same storage.
#[derive(Clone)]
pub struct BalanceCache {
    cache: Cache<BalanceKey, Money>,
}

impl BalanceCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 10,000 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of balances to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns a cached balance.
    #[must_use]
    pub fn get(&self, key: &BalanceKey) -> Option<Money> {
        self.cache.get(key)
    }

    /// Stores a freshly computed balance.
    pub fn insert(&self, key: BalanceKey, balance: Money) {
        self.cache.insert(key, balance);
    }

    /// Drops every cached balance.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the approximate number of cached balances.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}
