//! Regeneration Single-Flight
//!
//! Per-target locks so concurrent requests for the same stale document
//! regenerate it once. Distinct targets never contend; the outer map lock
//! is only held long enough to hand out the per-target mutex.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hands out one async mutex per cache target.
#[derive(Default)]
pub struct TargetLockManager {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl TargetLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for a target, creating it on first use.
    pub fn lock_for(&self, target: &str) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(target) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // Another task may have created it between the read and the write.
        map.entry(target.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
