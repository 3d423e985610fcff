//! One [`AllowlistSync`] per wallet, bounded, with idle eviction.

use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

use super::{AllowlistResolver, AllowlistSync};
use crate::sdk::ClaimSdk;

pub struct SyncRegistry<S> {
    resolver: Arc<AllowlistResolver<S>>,
    syncs: Mutex<HashMap<Address, Arc<AllowlistSync<S>>>>,
    capacity: usize,
}

impl<S: ClaimSdk> SyncRegistry<S> {
    pub fn new(resolver: Arc<AllowlistResolver<S>>, capacity: usize) -> Self {
        Self {
            resolver,
            syncs: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn resolver(&self) -> &Arc<AllowlistResolver<S>> {
        &self.resolver
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Address, Arc<AllowlistSync<S>>>> {
        self.syncs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Existing sync for `wallet`, or a fresh one in `Loading`. The flag is
    /// `true` when the sync was created by this call; the caller must start
    /// its first sync. At capacity the most idle sync makes room.
    pub fn get_or_insert(&self, wallet: Address) -> (Arc<AllowlistSync<S>>, bool) {
        let mut syncs = self.lock();
        if let Some(sync) = syncs.get(&wallet) {
            return (Arc::clone(sync), false);
        }
        if syncs.len() >= self.capacity {
            let most_idle = syncs
                .iter()
                .max_by_key(|(_, sync)| sync.idle_for())
                .map(|(addr, _)| *addr);
            if let Some(evicted) = most_idle {
                syncs.remove(&evicted);
                debug!(wallet = %evicted, capacity = self.capacity, "Registry full, evicted most idle sync");
            }
        }
        let sync = Arc::new(AllowlistSync::new(Arc::clone(&self.resolver), Some(wallet)));
        syncs.insert(wallet, Arc::clone(&sync));
        (sync, true)
    }

    pub fn get(&self, wallet: &Address) -> Option<Arc<AllowlistSync<S>>> {
        self.lock().get(wallet).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop syncs untouched for longer than `max_idle`. Returns how many.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut syncs = self.lock();
        let before = syncs.len();
        syncs.retain(|_, sync| sync.idle_for() <= max_idle);
        let evicted = before - syncs.len();
        if evicted > 0 {
            info!(evicted, remaining = syncs.len(), "Evicted idle eligibility syncs");
        }
        evicted
    }
}
