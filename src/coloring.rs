//! Greedy sequential colouring used as the clique upper bound.
//!
//! Vertices of the candidate set are coloured one class at a time: each class takes every
//! still-uncoloured vertex, in ascending internal order, that has no neighbour already in the
//! class. Each class is an independent set, so a clique inside `P` uses at most one vertex per
//! class and the number of classes bounds `ω(G[P])`.
//!
//! The colouring is also the branching order: the vertex at position `i` of [`Coloring::order`]
//! together with everything before it can be covered by `colors[i]` classes, so a clique through
//! that vertex restricted to `order[..=i]` has at most `colors[i]` members.

use crate::bitset::BitSet;
use crate::error::invariant_violation;
use crate::graph::BitGraph;

// ============================================================================
// Coloring
// ============================================================================

/// Colour classes of a candidate set, laid out class by class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coloring {
    /// Vertices grouped by colour class, ascending id within each class.
    pub order: Vec<usize>,
    /// 1-based colour of `order[i]`; non-decreasing.
    pub colors: Vec<usize>,
}

impl Coloring {
    /// Colours `candidates` greedily over `graph`.
    pub fn greedy(graph: &BitGraph, candidates: &BitSet) -> Self {
        let mut coloring = Self::default();
        coloring.recolor(graph, candidates);
        coloring
    }

    /// Recolours into the existing buffers, reusing their allocations.
    pub fn recolor(&mut self, graph: &BitGraph, candidates: &BitSet) {
        self.order.clear();
        self.colors.clear();

        let mut uncolored = candidates.clone();
        let mut available = BitSet::new(candidates.capacity());
        let mut color = 0usize;

        while !uncolored.is_empty() {
            color += 1;
            available.clone_from(&uncolored);
            while let Some(v) = available.first() {
                self.order.push(v);
                self.colors.push(color);
                uncolored.remove(v);
                available.remove(v);
                available.difference_with(graph.neighbors(v));
            }
        }

        self.check(candidates.count());
    }

    /// Aborts if the colouring is inconsistent with the candidate count.
    fn check(&self, candidates: usize) {
        if self.order.len() != candidates || self.colors.len() != candidates {
            invariant_violation("colouring does not cover the candidate set exactly");
        }
        if self.num_colors() > candidates {
            invariant_violation("more colours than candidates");
        }
        if self.colors.windows(2).any(|w| w[0] > w[1] || w[1] > w[0] + 1) {
            invariant_violation("colour numbers are not contiguous and non-decreasing");
        }
        if self.colors.first().is_some_and(|&c| c != 1) {
            invariant_violation("first colour class is not 1");
        }
    }

    /// Number of colour classes `k`, the clique bound for the coloured set.
    #[inline]
    pub fn num_colors(&self) -> usize {
        self.colors.last().copied().unwrap_or(0)
    }

    /// Number of coloured vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing was coloured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Colour assigned to `v`, if it was coloured.
    pub fn color_of(&self, v: usize) -> Option<usize> {
        self.order
            .iter()
            .position(|&u| u == v)
            .map(|i| self.colors[i])
    }

    /// Iterates the colour classes in colour order.
    pub fn classes(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.colors
            .chunk_by(|a, b| a == b)
            .scan(0usize, |start, chunk| {
                let class = &self.order[*start..*start + chunk.len()];
                *start += chunk.len();
                Some(class)
            })
    }
}

/// Number of greedy colour classes of `candidates`; an upper bound on `ω(G[candidates])`.
#[inline]
pub fn color_bound(graph: &BitGraph, candidates: &BitSet) -> usize {
    Coloring::greedy(graph, candidates).num_colors()
}

// ============================================================================
// Tests
// ============================================================================
