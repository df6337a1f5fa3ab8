//! Sequential depth-first branch and bound for maximum clique.
//!
//! Each call holds a partial clique `C` (the solver's stack) and a candidate set `P` of
//! vertices adjacent to everything in `C`. A branch is discarded once `|C| + extension(P)`
//! cannot beat the best clique found so far. Two extension bounds are provided:
//!
//! - [`Variant::Plain`]: `|P|`.
//! - [`Variant::Colored`]: the number of greedy colour classes of `P` (Tomita-style). The
//!   colouring also fixes the branching order, highest colour first, and the colour number of
//!   each remaining vertex bounds its own include branch without recolouring.

use crate::bitset::BitSet;
use crate::coloring::Coloring;
use crate::graph::BitGraph;

/// Which extension bound drives pruning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Bound by the number of remaining candidates.
    Plain,
    /// Bound by a greedy colouring of the remaining candidates.
    Colored,
}

/// Result of a sequential run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveResult {
    /// A maximum clique, in the order its vertices were chosen (internal ids).
    pub clique: Vec<usize>,
    /// Number of recursive calls made.
    pub calls: u64,
    /// Number of subtrees discarded by the bound.
    pub prunes: u64,
}

impl SolveResult {
    /// Size of the clique found.
    #[inline]
    pub fn size(&self) -> usize {
        self.clique.len()
    }
}

// ============================================================================
// SequentialSolver
// ============================================================================

/// Depth-first maximum clique solver over a [`BitGraph`].
#[derive(Debug)]
pub struct SequentialSolver<'g> {
    graph: &'g BitGraph,
    variant: Variant,
    /// Only cliques strictly larger than this are reported.
    floor: usize,
    stack: Vec<usize>,
    best: Vec<usize>,
    calls: u64,
    prunes: u64,
}

impl<'g> SequentialSolver<'g> {
    /// Creates a solver for `graph`.
    pub fn new(graph: &'g BitGraph, variant: Variant) -> Self {
        Self {
            graph,
            variant,
            floor: 0,
            stack: Vec::with_capacity(graph.order()),
            best: Vec::new(),
            calls: 0,
            prunes: 0,
        }
    }

    /// Prunes every branch that cannot produce a clique larger than `size`.
    ///
    /// If no such clique exists the result is empty.
    pub fn with_initial_bound(mut self, size: usize) -> Self {
        self.floor = size;
        self
    }

    /// Runs the search from the whole vertex set.
    pub fn solve(mut self) -> SolveResult {
        let candidates = self.graph.all_vertices();
        match self.variant {
            Variant::Plain => self.expand_plain(candidates),
            Variant::Colored => self.expand_colored(candidates),
        }
        log::debug!(
            "{:?} search finished: size={} calls={} prunes={}",
            self.variant,
            self.best.len(),
            self.calls,
            self.prunes
        );
        SolveResult {
            clique: self.best,
            calls: self.calls,
            prunes: self.prunes,
        }
    }

    /// Size any new clique has to exceed.
    #[inline(always)]
    fn target(&self) -> usize {
        self.best.len().max(self.floor)
    }

    #[inline]
    fn offer_current(&mut self) {
        if self.stack.len() > self.target() {
            self.best.clone_from(&self.stack);
        }
    }

    fn expand_plain(&mut self, mut candidates: BitSet) {
        self.calls += 1;
        if candidates.is_empty() {
            self.offer_current();
            return;
        }

        let size = self.stack.len();
        while let Some(v) = candidates.last() {
            if size + candidates.count() <= self.target() {
                self.prunes += 1;
                return;
            }
            self.stack.push(v);
            self.expand_plain(candidates.intersection(self.graph.neighbors(v)));
            self.stack.pop();
            candidates.remove(v);
        }
    }

    fn expand_colored(&mut self, mut candidates: BitSet) {
        self.calls += 1;
        if candidates.is_empty() {
            self.offer_current();
            return;
        }

        let size = self.stack.len();
        let coloring = Coloring::greedy(self.graph, &candidates);
        for idx in (0..coloring.len()).rev() {
            if size + coloring.colors[idx] <= self.target() {
                self.prunes += 1;
                return;
            }
            let v = coloring.order[idx];
            self.stack.push(v);
            self.expand_colored(candidates.intersection(self.graph.neighbors(v)));
            self.stack.pop();
            candidates.remove(v);
        }
    }
}

/// Finds a maximum clique of `graph` with the given bound.
pub fn max_clique(graph: &BitGraph, variant: Variant) -> SolveResult {
    SequentialSolver::new(graph, variant).solve()
}

/// Returns the clique number ω(G).
pub fn clique_number(graph: &BitGraph) -> usize {
    max_clique(graph, Variant::Colored).size()
}

// ============================================================================
// Tests
// ============================================================================
