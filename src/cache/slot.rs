//! Single-slot in-memory cache for the merged aggregate
//!
//! Provides a `ResultCache` that holds at most one complete `EmissionByYear`
//! together with the time it was stored.

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::data::EmissionByYear;

/// A cached aggregate and when it was stored
#[derive(Debug, Clone)]
pub struct CachedAggregate {
    /// The cached data
    pub data: Arc<EmissionByYear>,
    /// When the data was cached
    pub cached_at: DateTime<Utc>,
}

/// Holds the last fully computed aggregate
///
/// An aggregate without any year keys counts as no aggregate: `get` returns
/// `None` for it and `set` with one leaves the slot empty. There is no expiry;
/// the slot lives as long as the process and is only replaced or cleared by
/// the workflow.
#[derive(Debug, Default)]
pub struct ResultCache {
    slot: RwLock<Option<CachedAggregate>>,
}

impl ResultCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: every write is a single assignment
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CachedAggregate>> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CachedAggregate>> {
        self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached aggregate, if a non-empty one is stored
    pub fn get(&self) -> Option<CachedAggregate> {
        self.read_slot()
            .as_ref()
            .filter(|cached| !cached.data.is_empty())
            .cloned()
    }

    /// Replaces the slot with a complete aggregate
    ///
    /// Returns the stored entry, or `None` when `data` is empty.
    pub fn set(&self, data: EmissionByYear) -> Option<CachedAggregate> {
        let mut slot = self.write_slot();
        if data.is_empty() {
            *slot = None;
            return None;
        }

        let cached = CachedAggregate {
            data: Arc::new(data),
            cached_at: Utc::now(),
        };
        *slot = Some(cached.clone());
        Some(cached)
    }

    /// Empties the slot
    pub fn clear(&self) {
        *self.write_slot() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}
