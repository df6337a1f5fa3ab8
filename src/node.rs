//! One branch-and-bound step as a transportable value.
//!
//! A [`SearchNode`] carries everything needed to resume a branch on any worker: the partial
//! clique, the candidate set, and an upper bound on the clique size reachable below it. There is
//! no hidden execution state, so moving a branch between workers is just
//! [`SearchNode::encode`] on one side and [`SearchNode::decode`] on the other.
//!
//! Children are produced by a [`NodeGenerator`]. The generator colours the parent's candidates
//! once and yields the include-child of each vertex, highest colour first; what it has not yet
//! yielded is the exclude-continuation of the parent. Pulling children one at a time lets the
//! scheduler decide, on demand, how many become stealable tasks.

use crate::bitset::BitSet;
use crate::coloring::Coloring;
use crate::graph::BitGraph;
use crate::incumbent::LocalIncumbent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// SearchNode
// ============================================================================

/// A node of the search tree: `(clique, candidates, bound)` plus its depth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchNode {
    /// Chosen vertices, in choice order. Pairwise adjacent.
    pub clique: Vec<usize>,
    /// Vertices adjacent to every member of `clique` still eligible to extend it.
    pub candidates: BitSet,
    /// Upper bound on the size of any clique in this subtree.
    pub bound: usize,
    /// Distance from the root.
    pub depth: usize,
}

impl SearchNode {
    /// The root: empty clique, every vertex a candidate.
    pub fn root(graph: &BitGraph) -> Self {
        Self {
            clique: Vec::new(),
            candidates: graph.all_vertices(),
            bound: graph.order(),
            depth: 0,
        }
    }

    /// Size of the partial clique.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.clique.len()
    }

    /// Returns true if nothing can extend this clique.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Serialises the node for transport.
    ///
    /// # Errors
    /// Returns an error if serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialises a node produced by [`SearchNode::encode`].
    ///
    /// # Errors
    /// Returns an error for truncated or corrupt bytes, or a node whose candidate set is
    /// malformed or whose bound is below its own clique size.
    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        let node: Self = bincode::deserialize(bytes)?;
        if !node.candidates.is_well_formed() {
            return Err(Box::new(bincode::ErrorKind::Custom(
                "candidate set does not match its capacity".into(),
            )));
        }
        if node.bound < node.size() {
            return Err(Box::new(bincode::ErrorKind::Custom(format!(
                "bound {} below clique size {}",
                node.bound,
                node.size()
            ))));
        }
        Ok(node)
    }
}

// ============================================================================
// SearchSpace
// ============================================================================

/// Result of inspecting one node eagerly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    /// The node's clique, if it beats the incumbent passed in.
    pub improvement: Option<Vec<usize>>,
    /// Children that survive the bound; empty when the node is pruned or a leaf.
    pub children: Vec<SearchNode>,
}

impl Expansion {
    /// Returns true if the node produced no children.
    #[inline]
    pub fn is_pruned(&self) -> bool {
        self.children.is_empty()
    }
}

/// The registered search space: a graph plus the branch and bound callbacks over it.
#[derive(Clone, Debug)]
pub struct SearchSpace {
    graph: Arc<BitGraph>,
}

impl SearchSpace {
    /// Wraps a shared graph.
    pub fn new(graph: Arc<BitGraph>) -> Self {
        Self { graph }
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &BitGraph {
        &self.graph
    }

    /// The root node.
    pub fn root(&self) -> SearchNode {
        SearchNode::root(&self.graph)
    }

    /// Returns true if no clique below `node` can beat `incumbent`.
    #[inline(always)]
    pub fn prunable(node: &SearchNode, incumbent: usize) -> bool {
        node.bound <= incumbent
    }

    /// Lazily generates the children of `node`.
    ///
    /// The generator is empty when `node` cannot beat `incumbent`; the candidates are not
    /// coloured in that case.
    pub fn children(&self, node: &SearchNode, incumbent: usize) -> NodeGenerator {
        if Self::prunable(node, incumbent) {
            NodeGenerator::exhausted(&self.graph, node)
        } else {
            NodeGenerator::new(&self.graph, node)
        }
    }

    /// Inspects `node` against `incumbent` and returns every surviving child.
    pub fn expand(&self, node: &SearchNode, incumbent: usize) -> Expansion {
        let improvement = (node.size() > incumbent).then(|| node.clique.clone());
        let incumbent = incumbent.max(node.size());
        if Self::prunable(node, incumbent) || node.is_leaf() {
            return Expansion {
                improvement,
                children: Vec::new(),
            };
        }
        let children = self.children(node, incumbent).take(usize::MAX, incumbent);
        Expansion {
            improvement,
            children,
        }
    }

    /// Splits the tree below `node` breadth-first, down to `depth` levels.
    ///
    /// Cliques met on the way are offered to `incumbent`, and its size prunes the split.
    /// Every returned node sits exactly `depth` levels below `node`; branches that die out
    /// earlier leave nothing behind except what they offered to `incumbent`.
    pub fn split(
        &self,
        node: SearchNode,
        depth: usize,
        incumbent: &mut LocalIncumbent,
    ) -> Vec<SearchNode> {
        let mut frontier = vec![node];
        for _ in 0..depth {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            for node in frontier {
                let expansion = self.expand(&node, incumbent.size());
                if let Some(clique) = expansion.improvement {
                    incumbent.offer(&clique);
                }
                next.extend(expansion.children);
            }
            frontier = next;
        }
        let best = incumbent.size();
        frontier.retain(|n| !Self::prunable(n, best));
        frontier
    }
}

// ============================================================================
// NodeGenerator
// ============================================================================

/// Pull-based generator over the children of one node.
#[derive(Clone, Debug)]
pub struct NodeGenerator {
    parent_clique: Vec<usize>,
    parent_depth: usize,
    /// Parent candidates minus every vertex already branched on.
    remaining: BitSet,
    coloring: Coloring,
    /// Children still to produce are `coloring.order[..next]`.
    next: usize,
    graph: Arc<BitGraph>,
}

impl NodeGenerator {
    /// Colours the candidates of `parent` and prepares to branch on them.
    pub fn new(graph: &Arc<BitGraph>, parent: &SearchNode) -> Self {
        let coloring = Coloring::greedy(graph, &parent.candidates);
        let next = coloring.len();
        Self {
            parent_clique: parent.clique.clone(),
            parent_depth: parent.depth,
            remaining: parent.candidates.clone(),
            coloring,
            next,
            graph: Arc::clone(graph),
        }
    }

    /// A generator that yields nothing.
    fn exhausted(graph: &Arc<BitGraph>, parent: &SearchNode) -> Self {
        Self {
            parent_clique: parent.clique.clone(),
            parent_depth: parent.depth,
            remaining: BitSet::new(graph.order()),
            coloring: Coloring::default(),
            next: 0,
            graph: Arc::clone(graph),
        }
    }

    /// Depth of the parent node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.parent_depth
    }

    /// Upper bound on the number of children left.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.next
    }

    /// Returns true once no further child can be produced.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.next == 0
    }

    /// Produces the next child whose bound beats `incumbent`.
    ///
    /// Colours only decrease along the generator, so the first child that fails the bound
    /// ends the generator.
    pub fn next_child(&mut self, incumbent: usize) -> Option<SearchNode> {
        if self.next == 0 {
            return None;
        }
        let idx = self.next - 1;
        let bound = self.parent_clique.len() + self.coloring.colors[idx];
        if bound <= incumbent {
            self.next = 0;
            return None;
        }
        self.next = idx;

        let v = self.coloring.order[idx];
        let candidates = self.remaining.intersection(self.graph.neighbors(v));
        self.remaining.remove(v);

        let mut clique = Vec::with_capacity(self.parent_clique.len() + 1);
        clique.extend_from_slice(&self.parent_clique);
        clique.push(v);

        Some(SearchNode {
            clique,
            candidates,
            bound,
            depth: self.parent_depth + 1,
        })
    }

    /// Pulls up to `k` surviving children.
    pub fn take(&mut self, k: usize, incumbent: usize) -> Vec<SearchNode> {
        let mut out = Vec::new();
        while out.len() < k {
            match self.next_child(incumbent) {
                Some(child) => out.push(child),
                None => break,
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::clique_number;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn space(graph: BitGraph) -> SearchSpace {
        SearchSpace::new(Arc::new(graph))
    }

    /// Exhaustive depth-first search driven only through `expand`.
    fn search_with_expand(space: &SearchSpace) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();
        let mut stack = vec![space.root()];
        while let Some(node) = stack.pop() {
            let expansion = space.expand(&node, best.len());
            if let Some(clique) = expansion.improvement {
                best = clique;
            }
            stack.extend(expansion.children);
        }
        best
    }

    #[test]
    fn root_covers_every_vertex() {
        let g = BitGraph::complete(9);
        let root = SearchNode::root(&g);
        assert_eq!(root.candidates.count(), 9);
        assert_eq!(root.bound, 9);
        assert_eq!(root.depth, 0);
        assert!(root.clique.is_empty());
    }

    #[test]
    fn encode_decode_preserves_node() {
        let mut rng = XorShiftRng::seed_from_u64(3);
        let s = space(BitGraph::random(150, 0.4, &mut rng));
        let mut generator = s.children(&s.root(), 0);
        let child = generator.next_child(0).unwrap();
        let bytes = child.encode().unwrap();
        assert_eq!(SearchNode::decode(&bytes).unwrap(), child);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(SearchNode::decode(&[1, 2, 3]).is_err());
        assert!(SearchNode::decode(&[]).is_err());
    }

    #[test]
    fn decode_rejects_inconsistent_bound() {
        let g = BitGraph::complete(4);
        let mut node = SearchNode::root(&g);
        node.clique = vec![0, 1, 2];
        node.bound = 2;
        let bytes = node.encode().unwrap();
        assert!(SearchNode::decode(&bytes).is_err());
    }

    #[test]
    fn children_are_cliques_with_valid_bounds() {
        let mut rng = XorShiftRng::seed_from_u64(0x51);
        let g = BitGraph::random(12, 0.6, &mut rng);
        let s = space(g.clone());
        let mut stack = vec![s.root()];
        while let Some(node) = stack.pop() {
            assert!(g.is_clique(&node.clique));
            for v in &node.candidates {
                assert!(node.clique.iter().all(|&u| g.has_edge(u, v)));
            }
            // The bound must cover the best clique reachable below the node.
            let sub = BitGraph::build(
                g.order(),
                &g.edges()
                    .into_iter()
                    .filter(|&(u, v)| node.candidates.contains(u) && node.candidates.contains(v))
                    .collect::<Vec<_>>(),
            )
            .unwrap();
            // Isolated vertices outside the candidates add at most one, which `min` caps.
            let within = clique_number(&sub).min(node.candidates.count());
            assert!(node.bound >= node.size() + within);
            stack.extend(s.children(&node, 0).take(usize::MAX, 0));
        }
    }

    #[test]
    fn expand_prunes_when_bound_cannot_beat_incumbent() {
        let s = space(BitGraph::complete(4));
        let root = s.root();
        let expansion = s.expand(&root, 4);
        assert!(expansion.is_pruned());
        assert!(expansion.improvement.is_none());
    }

    #[test]
    fn expand_reports_improvement() {
        let s = space(BitGraph::complete(3));
        let child = s.children(&s.root(), 0).next_child(0).unwrap();
        let expansion = s.expand(&child, 0);
        assert_eq!(expansion.improvement, Some(child.clique.clone()));
        let again = s.expand(&child, 1);
        assert!(again.improvement.is_none());
    }

    #[test]
    fn generator_stops_at_first_failing_bound() {
        let s = space(BitGraph::complete(5));
        let mut generator = s.children(&s.root(), 0);
        assert_eq!(generator.remaining(), 5);
        // Colours are 5,4,3,2,1 from the top; with incumbent 3 only colours 5 and 4 survive.
        let kids = generator.take(usize::MAX, 3);
        assert_eq!(kids.len(), 2);
        assert!(generator.is_exhausted());
    }

    #[test]
    fn children_of_prunable_node_are_empty() {
        let s = space(BitGraph::complete(6));
        let mut generator = s.children(&s.root(), 6);
        assert!(generator.is_exhausted());
        assert!(generator.next_child(0).is_none());
    }

    #[test]
    fn search_through_expand_is_exact() {
        let mut rng = XorShiftRng::seed_from_u64(0xE4);
        for _ in 0..25 {
            let g = BitGraph::random(30, 0.5, &mut rng);
            let s = space(g.clone());
            let best = search_with_expand(&s);
            assert!(g.is_clique(&best));
            assert_eq!(best.len(), clique_number(&g));
        }
    }

    #[test]
    fn split_frontier_plus_incumbent_is_exact() {
        let mut rng = XorShiftRng::seed_from_u64(0x5917);
        let g = BitGraph::random(40, 0.5, &mut rng);
        let s = space(g.clone());
        let mut incumbent = LocalIncumbent::new();
        let frontier = s.split(s.root(), 2, &mut incumbent);
        assert!(frontier.iter().all(|n| n.depth == 2));

        let mut best = incumbent.clique().to_vec();
        for node in frontier {
            let mut stack = vec![node];
            while let Some(node) = stack.pop() {
                let expansion = s.expand(&node, best.len());
                if let Some(clique) = expansion.improvement {
                    best = clique;
                }
                stack.extend(expansion.children);
            }
        }
        assert_eq!(best.len(), clique_number(&g));
    }
}
