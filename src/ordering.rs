//! Degree-based vertex relabelling.
//!
//! Internal ids are assigned by non-decreasing degree, ties broken by original id. The solver
//! branches from the highest internal id downward, so high-degree vertices are tried first, and
//! greedy colouring in ascending internal order starts from the sparse end of the graph, which
//! tends to pack colour classes tighter.

use crate::graph::BitGraph;

/// A bijection between original and internal vertex ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    /// `forward[original] = internal`.
    forward: Vec<usize>,
    /// `inverse[internal] = original`.
    inverse: Vec<usize>,
}

impl Permutation {
    /// The identity on `0..n`.
    pub fn identity(n: usize) -> Self {
        let ids: Vec<usize> = (0..n).collect();
        Self {
            forward: ids.clone(),
            inverse: ids,
        }
    }

    /// Builds the permutation whose `i`-th internal vertex is `inverse[i]`.
    ///
    /// # Panics
    /// Panics if `inverse` is not a permutation of `0..inverse.len()`.
    pub fn from_inverse(inverse: Vec<usize>) -> Self {
        let n = inverse.len();
        let mut forward = vec![usize::MAX; n];
        for (internal, &original) in inverse.iter().enumerate() {
            assert!(
                original < n && forward[original] == usize::MAX,
                "not a permutation: {original} repeated or out of range"
            );
            forward[original] = internal;
        }
        Self { forward, inverse }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true for the permutation of zero vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// α: original id to internal id.
    #[inline(always)]
    pub fn to_internal(&self, original: usize) -> usize {
        self.forward[original]
    }

    /// α⁻¹: internal id to original id.
    #[inline(always)]
    pub fn to_original(&self, internal: usize) -> usize {
        self.inverse[internal]
    }

    /// Maps internal ids back to original ids, preserving order.
    pub fn map_to_original(&self, internal: &[usize]) -> Vec<usize> {
        internal.iter().map(|&v| self.to_original(v)).collect()
    }
}

/// Orders vertices by non-decreasing degree (stable on original id).
pub fn degree_ordering(graph: &BitGraph) -> Permutation {
    let degrees: Vec<usize> = (0..graph.order()).map(|v| graph.degree(v)).collect();
    let mut inverse: Vec<usize> = (0..graph.order()).collect();
    inverse.sort_by_key(|&v| degrees[v]);
    Permutation::from_inverse(inverse)
}
