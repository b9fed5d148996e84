//! Bounded, recency-ordered geolocation cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::geo::provider::{GeoEntry, GeoLocation, GeoProvider, LookupError};
use crate::observability::metrics;

struct Slot {
    entry: GeoEntry,
    last_access: u64,
}

/// Map plus the logical clock that orders accesses.
#[derive(Default)]
struct CacheState {
    slots: HashMap<String, Slot>,
    clock: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_access)
            .map(|(address, _)| address.clone())?;
        self.slots.remove(&oldest);
        Some(oldest)
    }
}

/// Process-wide address → location cache.
///
/// Holds at most `capacity` addresses. When full, inserting a new address
/// evicts the one accessed least recently; a hit refreshes the access time.
/// Failed lookups are cached as [`GeoEntry::Unknown`] and never retried while
/// the slot lives. Entries never expire by age.
pub struct GeoCache<P> {
    state: Mutex<CacheState>,
    capacity: usize,
    timeout: Duration,
    provider: P,
}

impl<P: GeoProvider> GeoCache<P> {
    pub fn new(provider: P, capacity: usize, timeout: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: capacity.max(1),
            timeout,
            provider,
        }
    }

    /// Cached entry for `address`, calling the provider on a miss.
    ///
    /// The provider call runs outside the lock. Two concurrent misses for the
    /// same address may both call out; the last one to finish wins the slot.
    pub async fn lookup(&self, address: &str) -> GeoEntry {
        if let Some(entry) = self.touch(address) {
            metrics::record_geo_lookup("hit");
            return entry;
        }

        let entry = match self.fetch(address).await {
            Ok(location) => {
                metrics::record_geo_lookup("miss_ok");
                GeoEntry::Located(location)
            }
            Err(e) => {
                tracing::debug!(address = %address, error = %e, "Geo lookup failed");
                metrics::record_geo_lookup("miss_failed");
                GeoEntry::Unknown
            }
        };

        self.store(address, entry.clone());
        entry
    }

    async fn fetch(&self, address: &str) -> Result<GeoLocation, LookupError> {
        tokio::time::timeout(self.timeout, self.provider.fetch(address))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
    }

    fn touch(&self, address: &str) -> Option<GeoEntry> {
        let mut state = self.lock();
        let now = state.tick();
        state.slots.get_mut(address).map(|slot| {
            slot.last_access = now;
            slot.entry.clone()
        })
    }

    fn store(&self, address: &str, entry: GeoEntry) {
        let mut state = self.lock();
        let now = state.tick();

        if !state.slots.contains_key(address) && state.slots.len() >= self.capacity {
            if let Some(evicted) = state.evict_oldest() {
                tracing::debug!(evicted = %evicted, "Geo cache full, evicted oldest entry");
                metrics::record_geo_eviction();
            }
        }

        state.slots.insert(
            address.to_string(),
            Slot {
                entry,
                last_access: now,
            },
        );
        metrics::record_geo_cache_size(state.slots.len());
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if `address` currently has a slot. Does not refresh it.
    pub fn contains(&self, address: &str) -> bool {
        self.lock().slots.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
