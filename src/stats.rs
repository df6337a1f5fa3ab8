//! Search counters shared between workers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by workers.
#[derive(Debug, Default)]
pub struct AtomicStats {
    /// Search nodes expanded.
    pub nodes: AtomicU64,
    /// Nodes discarded by the bound.
    pub prunes: AtomicU64,
    /// Tasks handed to the scheduler.
    pub spawned: AtomicU64,
    /// Tasks taken from another worker's deque.
    pub steals: AtomicU64,
    /// Incumbent improvements published.
    pub improvements: AtomicU64,
    /// Incumbent messages delivered to inboxes.
    pub messages: AtomicU64,
}

impl AtomicStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a worker's locally accumulated node and prune counts.
    #[inline]
    pub fn add_work(&self, nodes: u64, prunes: u64) {
        self.nodes.fetch_add(nodes, Ordering::Relaxed);
        self.prunes.fetch_add(prunes, Ordering::Relaxed);
    }

    /// Records a spawned task.
    #[inline]
    pub fn inc_spawned(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a stolen task.
    #[inline]
    pub fn inc_steals(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a published improvement.
    #[inline]
    pub fn inc_improvements(&self) {
        self.improvements.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` delivered messages.
    #[inline]
    pub fn add_messages(&self, count: u64) {
        self.messages.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the current values.
    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            nodes: self.nodes.load(Ordering::Relaxed),
            prunes: self.prunes.load(Ordering::Relaxed),
            spawned: self.spawned.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            improvements: self.improvements.load(Ordering::Relaxed),
            messages: self.messages.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`AtomicStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes expanded.
    pub nodes: u64,
    /// Nodes discarded by the bound.
    pub prunes: u64,
    /// Tasks handed to the scheduler.
    pub spawned: u64,
    /// Tasks stolen across workers.
    pub steals: u64,
    /// Incumbent improvements published.
    pub improvements: u64,
    /// Incumbent messages delivered.
    pub messages: u64,
}
