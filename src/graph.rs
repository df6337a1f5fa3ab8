//! Immutable bit-parallel adjacency over vertex ids `0..n`.

use crate::bitset::BitSet;
use crate::error::GraphError;
use crate::ordering::Permutation;
use rand::Rng;

// ============================================================================
// BitGraph
// ============================================================================

/// An undirected simple graph stored as one neighbour [`BitSet`] per vertex.
///
/// Invariants (established by every constructor, never mutated afterwards):
/// - `v ∈ N(u)` iff `u ∈ N(v)`;
/// - `v ∉ N(v)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGraph {
    adj: Vec<BitSet>,
}

impl BitGraph {
    /// Builds a graph on `n` vertices from an undirected edge list.
    ///
    /// Duplicate edges (in either orientation) are harmless.
    ///
    /// # Errors
    /// Returns [`GraphError::VertexOutOfRange`] if an endpoint is `>= n`, and
    /// [`GraphError::SelfLoop`] for an edge `(v, v)`.
    pub fn build(n: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let mut adj = vec![BitSet::new(n); n];
        for &(u, v) in edges {
            if u >= n || v >= n {
                return Err(GraphError::VertexOutOfRange { u, v, n });
            }
            if u == v {
                return Err(GraphError::SelfLoop { vertex: u });
            }
            adj[u].insert(v);
            adj[v].insert(u);
        }
        Ok(Self { adj })
    }

    /// Creates `n` isolated vertices.
    pub fn empty(n: usize) -> Self {
        Self {
            adj: vec![BitSet::new(n); n],
        }
    }

    /// Creates the complete graph `K_n`.
    pub fn complete(n: usize) -> Self {
        let adj = (0..n)
            .map(|v| {
                let mut row = BitSet::full(n);
                row.remove(v);
                row
            })
            .collect();
        Self { adj }
    }

    /// Samples an Erdős–Rényi graph `G(n, p)`.
    pub fn random<R: Rng>(n: usize, p: f64, rng: &mut R) -> Self {
        debug_assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");
        let mut adj = vec![BitSet::new(n); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.random_bool(p) {
                    adj[i].insert(j);
                    adj[j].insert(i);
                }
            }
        }
        Self { adj }
    }

    /// Number of vertices.
    #[inline(always)]
    pub fn order(&self) -> usize {
        self.adj.len()
    }

    /// Neighbour set of `v`.
    #[inline(always)]
    pub fn neighbors(&self, v: usize) -> &BitSet {
        &self.adj[v]
    }

    /// Returns whether the edge `(u, v)` exists.
    #[inline(always)]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adj[u].contains(v)
    }

    /// Degree of `v`.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.adj[v].count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(BitSet::count).sum::<usize>() / 2
    }

    /// Every edge once, as `(u, v)` with `u < v`, in lexicographic order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (u, row) in self.adj.iter().enumerate() {
            edges.extend(row.iter().filter(|&v| v > u).map(|v| (u, v)));
        }
        edges
    }

    /// The set of all vertices.
    #[inline]
    pub fn all_vertices(&self) -> BitSet {
        BitSet::full(self.order())
    }

    /// Edge density `2m / (n (n - 1))`; zero for fewer than two vertices.
    pub fn density(&self) -> f64 {
        let n = self.order();
        if n < 2 {
            return 0.0;
        }
        (2 * self.edge_count()) as f64 / (n * (n - 1)) as f64
    }

    /// Returns a copy relabelled through `perm` (original `v` becomes `perm.to_internal(v)`).
    pub fn permuted(&self, perm: &Permutation) -> Self {
        debug_assert_eq!(perm.len(), self.order());
        let n = self.order();
        let mut adj = vec![BitSet::new(n); n];
        for (u, row) in self.adj.iter().enumerate() {
            let pu = perm.to_internal(u);
            for v in row {
                adj[pu].insert(perm.to_internal(v));
            }
        }
        Self { adj }
    }

    /// Returns true iff `vertices` are distinct, in range, and pairwise adjacent.
    pub fn is_clique(&self, vertices: &[usize]) -> bool {
        let n = self.order();
        let mut seen = BitSet::new(n);
        for &v in vertices {
            if v >= n || seen.contains(v) {
                return false;
            }
            seen.insert(v);
        }
        for &v in vertices {
            let mut others = seen.clone();
            others.remove(v);
            if !others.is_subset(&self.adj[v]) {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
