//! The incumbent: best clique found so far, as a monotone max-register.
//!
//! Nothing here ever lowers a stored size. Workers keep a [`LocalIncumbent`] and apply
//! accept-if-greater to anything they find or receive, so duplicated, stale, or reordered
//! updates are harmless. [`SharedBound`] is the process-wide size used by the eager broadcast
//! strategy; it is raised with a CAS loop and read without blocking.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// SharedBound
// ============================================================================

/// Lock-free best-known clique size.
///
/// Only sizes of cliques that have actually been found are stored, so pruning against this value
/// is always sound.
#[derive(Debug, Default)]
pub struct SharedBound {
    size: AtomicUsize,
}

impl SharedBound {
    /// Creates a bound starting at `initial`.
    pub fn new(initial: usize) -> Self {
        Self {
            size: AtomicUsize::new(initial),
        }
    }

    /// Current best size.
    #[inline]
    pub fn get(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Raises the bound to `size` if larger. Returns true if this call raised it.
    pub fn raise(&self, size: usize) -> bool {
        let mut current = self.size.load(Ordering::Relaxed);
        while size > current {
            match self.size.compare_exchange_weak(
                current,
                size,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }
}

// ============================================================================
// IncumbentUpdate
// ============================================================================

/// An incumbent candidate in transit between workers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncumbentUpdate {
    /// Worker that found the clique.
    pub origin: usize,
    /// The clique, internal ids.
    pub clique: Vec<usize>,
}

impl IncumbentUpdate {
    /// Size of the carried clique.
    #[inline]
    pub fn size(&self) -> usize {
        self.clique.len()
    }
}

// ============================================================================
// LocalIncumbent
// ============================================================================

/// A worker's view of the incumbent.
///
/// `size` can run ahead of `clique.len()`: a worker that only learns a better *size* (through the
/// shared bound) prunes with it but keeps its own best clique for the final reduction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalIncumbent {
    clique: Vec<usize>,
    size: usize,
}

impl LocalIncumbent {
    /// Empty incumbent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Best size this worker knows of, found locally or learned from others.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Best clique held by this worker.
    #[inline]
    pub fn clique(&self) -> &[usize] {
        &self.clique
    }

    /// Consumes the incumbent, returning its clique.
    pub fn into_clique(self) -> Vec<usize> {
        self.clique
    }

    /// Accepts `clique` if it is larger than anything known. Returns true if accepted.
    pub fn offer(&mut self, clique: &[usize]) -> bool {
        if clique.len() > self.size {
            self.clique.clear();
            self.clique.extend_from_slice(clique);
            self.size = clique.len();
            true
        } else {
            false
        }
    }

    /// Applies an update from another worker with accept-if-greater.
    pub fn observe(&mut self, update: IncumbentUpdate) -> bool {
        if update.size() > self.size {
            self.size = update.size();
            self.clique = update.clique;
            true
        } else {
            false
        }
    }

    /// Raises the known size without a witness clique.
    #[inline]
    pub fn raise_size(&mut self, size: usize) {
        self.size = self.size.max(size);
    }
}

// ============================================================================
// Tests
// ============================================================================
