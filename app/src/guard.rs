//! Per-channel single-flight guard.
//!
//! At most one sync runs per channel. A trigger that arrives while one is
//! running is dropped, not queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Default)]
pub struct SyncGuards {
    active: Arc<Mutex<HashSet<String>>>,
}

/// Proof that the holder owns the sync slot for one channel.
/// The slot is released when the permit is dropped.
#[must_use]
pub struct SyncPermit {
    active: Arc<Mutex<HashSet<String>>>,
    channel_id: String,
}

impl SyncGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the channel, or `None` if a sync for it is already running.
    pub fn try_acquire(&self, channel_id: &str) -> Option<SyncPermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(channel_id.to_string()) {
            return None;
        }
        Some(SyncPermit {
            active: Arc::clone(&self.active),
            channel_id: channel_id.to_string(),
        })
    }

    pub fn is_active(&self, channel_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(channel_id)
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.channel_id);
    }
}
