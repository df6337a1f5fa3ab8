//! Independent checks on reported cliques, plus bundled reference instances.
//!
//! [`check_clique`] looks only at edges of the input graph, never at solver state, so it can
//! vouch for any result regardless of which algorithm or relabelling produced it.

use crate::dimacs::{parse_dimacs, parse_matrix, ParsedGraph};
use crate::error::ParseError;
use crate::graph::BitGraph;
use crate::search::{self, Algorithm, SearchConfig};

// ============================================================================
// Public API
// ============================================================================

/// Checks that `clique` is a clique of `graph`.
///
/// # Errors
/// Returns a description of the first problem: an out-of-range or repeated vertex, or a
/// non-adjacent pair.
pub fn check_clique(graph: &BitGraph, clique: &[usize]) -> Result<(), String> {
    let n = graph.order();
    for (i, &u) in clique.iter().enumerate() {
        if u >= n {
            return Err(format!("vertex {u} is outside 0..{n}"));
        }
        for &v in &clique[i + 1..] {
            if u == v {
                return Err(format!("vertex {u} appears more than once"));
            }
            if v < n && !graph.has_edge(u, v) {
                return Err(format!("vertices {u} and {v} are not adjacent"));
            }
        }
    }
    Ok(())
}

/// Returns true if no vertex outside `clique` is adjacent to all of it.
///
/// Assumes `clique` already passed [`check_clique`].
pub fn is_maximal(graph: &BitGraph, clique: &[usize]) -> bool {
    let mut common = graph.all_vertices();
    for &v in clique {
        common.intersect_with(graph.neighbors(v));
    }
    common.is_empty()
}

/// A bundled graph with a known clique number.
#[derive(Clone, Copy, Debug)]
pub struct KnownInstance {
    /// File name under `data/`.
    pub name: &'static str,
    /// File contents.
    pub text: &'static str,
    /// Whether `text` is an adjacency matrix rather than DIMACS.
    pub matrix: bool,
    /// Clique number.
    pub omega: usize,
}

/// The bundled reference graphs.
pub const KNOWN_INSTANCES: [KnownInstance; 3] = [
    KnownInstance {
        name: "johnson8-2-4.clq",
        text: include_str!("../data/johnson8-2-4.clq"),
        matrix: false,
        omega: 4,
    },
    KnownInstance {
        name: "hamming6-4.clq",
        text: include_str!("../data/hamming6-4.clq"),
        matrix: false,
        omega: 4,
    },
    KnownInstance {
        name: "petersen.txt",
        text: include_str!("../data/petersen.txt"),
        matrix: true,
        omega: 2,
    },
];

impl KnownInstance {
    /// Parses the bundled text.
    ///
    /// # Errors
    /// Returns [`ParseError`] if the bundled text is malformed.
    pub fn graph(&self) -> Result<BitGraph, ParseError> {
        let parsed: ParsedGraph = if self.matrix {
            parse_matrix(self.text)?
        } else {
            parse_dimacs(self.text)?
        };
        parsed.into_graph()
    }
}

/// Solves every bundled instance with every algorithm and checks the answers.
///
/// # Errors
/// Returns an error message naming the instance and algorithm that failed.
pub fn validate_known_graphs(base: &SearchConfig) -> Result<(), String> {
    for instance in &KNOWN_INSTANCES {
        let graph = instance.graph().map_err(|e| format!("{}: {e}", instance.name))?;
        for algorithm in Algorithm::ALL {
            validate_case(instance, &graph, algorithm, base)?;
        }
    }
    Ok(())
}

// ============================================================================
// Internal
// ============================================================================

fn validate_case(
    instance: &KnownInstance,
    graph: &BitGraph,
    algorithm: Algorithm,
    base: &SearchConfig,
) -> Result<(), String> {
    let name = instance.name;
    let config = SearchConfig {
        algorithm,
        ..base.clone()
    };
    let outcome = search::run(graph, &config).map_err(|e| format!("{name} [{algorithm}]: {e}"))?;

    check_clique(graph, &outcome.clique).map_err(|e| format!("{name} [{algorithm}]: {e}"))?;
    if outcome.size != instance.omega {
        return Err(format!(
            "{name} [{algorithm}]: expected clique number {}, found {}",
            instance.omega, outcome.size
        ));
    }
    if !is_maximal(graph, &outcome.clique) {
        return Err(format!("{name} [{algorithm}]: clique is not maximal"));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::SkeletonConfig;

    fn base() -> SearchConfig {
        SearchConfig {
            skeleton: SkeletonConfig {
                workers: 2,
                target_tasks: Some(4),
                ..SkeletonConfig::default()
            },
            ..SearchConfig::default()
        }
    }

    #[test]
    fn bundled_graphs_have_expected_clique_numbers() {
        validate_known_graphs(&base()).unwrap();
    }

    #[test]
    fn bundled_graph_sizes() {
        let sizes: Vec<(usize, usize)> = KNOWN_INSTANCES
            .iter()
            .map(|i| {
                let g = i.graph().unwrap();
                (g.order(), g.edge_count())
            })
            .collect();
        assert_eq!(sizes, vec![(28, 210), (64, 704), (10, 15)]);
    }

    #[test]
    fn check_clique_accepts_cliques() {
        let g = BitGraph::complete(4);
        assert!(check_clique(&g, &[]).is_ok());
        assert!(check_clique(&g, &[2]).is_ok());
        assert!(check_clique(&g, &[3, 0, 1]).is_ok());
    }

    #[test]
    fn check_clique_rejects_bad_input() {
        let g = BitGraph::build(4, &[(0, 1), (1, 2), (0, 2)]).unwrap();
        let err = check_clique(&g, &[0, 1, 3]).unwrap_err();
        assert!(err.contains("not adjacent"));
        assert!(check_clique(&g, &[0, 0]).unwrap_err().contains("more than once"));
        assert!(check_clique(&g, &[0, 7]).unwrap_err().contains("outside"));
    }

    #[test]
    fn maximality() {
        let g = BitGraph::build(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]).unwrap();
        assert!(is_maximal(&g, &[0, 1, 2]));
        assert!(is_maximal(&g, &[2, 3]));
        assert!(!is_maximal(&g, &[0, 1]));
        assert!(!is_maximal(&BitGraph::empty(1), &[]));
    }
}
