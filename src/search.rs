//! Run facade: relabel, solve with the chosen algorithm, map back, validate.

use crate::error::Result;
use crate::graph::BitGraph;
use crate::ordering::{degree_ordering, Permutation};
use crate::skeleton::{self, SkeletonConfig, Strategy};
use crate::solver::{SequentialSolver, Variant};
use crate::stats::SearchStats;
use crate::validate::check_clique;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

/// Which solver runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Sequential, candidate-count bound.
    Plain,
    /// Sequential, colouring bound.
    #[default]
    Colored,
    /// Parallel, shared atomic incumbent.
    Broadcast,
    /// Parallel, incumbent exchanged by message.
    SafeExchange,
    /// Parallel, messages plus on-demand task creation.
    SafeExchangeDynamic,
}

impl Algorithm {
    /// Every algorithm, sequential first.
    pub const ALL: [Self; 5] = [
        Self::Plain,
        Self::Colored,
        Self::Broadcast,
        Self::SafeExchange,
        Self::SafeExchangeDynamic,
    ];

    /// The skeleton strategy, or `None` for the sequential solvers.
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Self::Plain | Self::Colored => None,
            Self::Broadcast => Some(Strategy::Broadcast),
            Self::SafeExchange => Some(Strategy::SafeExchange),
            Self::SafeExchangeDynamic => Some(Strategy::SafeExchangeDynamic),
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Colored => "colored",
            Self::Broadcast => "broadcast",
            Self::SafeExchange => "safe",
            Self::SafeExchangeDynamic => "dynamic",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown algorithm '{s}' (expected plain, colored, broadcast, safe or dynamic)")
            })
    }
}

/// Search parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Solver to run.
    pub algorithm: Algorithm,
    /// Relabel vertices by non-decreasing degree before searching.
    pub permute: bool,
    /// Parallel parameters. `skeleton.strategy` is replaced by the one `algorithm` names.
    pub skeleton: SkeletonConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Colored,
            permute: true,
            skeleton: SkeletonConfig::default(),
        }
    }
}

/// Result of [`run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// A maximum clique, original vertex ids, ascending.
    pub clique: Vec<usize>,
    /// `clique.len()`.
    pub size: usize,
    /// Wall-clock time including relabelling.
    pub elapsed: Duration,
    /// Whether [`check_clique`] accepted the clique against the input graph.
    pub valid: bool,
    /// Search counters.
    pub stats: SearchStats,
}

// ============================================================================
// Entry point
// ============================================================================

/// Finds a maximum clique of `graph`.
///
/// # Errors
/// Returns an error for an invalid parallel configuration or a failure inside the skeleton.
pub fn run(graph: &BitGraph, config: &SearchConfig) -> Result<SearchOutcome> {
    let start = Instant::now();
    log::info!(
        "{} search: {} vertices, {} edges, density {:.3}",
        config.algorithm,
        graph.order(),
        graph.edge_count(),
        graph.density()
    );

    let (perm, internal) = if config.permute {
        let perm = degree_ordering(graph);
        let internal = graph.permuted(&perm);
        (perm, internal)
    } else {
        (Permutation::identity(graph.order()), graph.clone())
    };

    let (clique, stats) = match config.algorithm.strategy() {
        None => {
            let variant = match config.algorithm {
                Algorithm::Plain => Variant::Plain,
                _ => Variant::Colored,
            };
            let result = SequentialSolver::new(&internal, variant).solve();
            let stats = SearchStats {
                nodes: result.calls,
                prunes: result.prunes,
                ..SearchStats::default()
            };
            (result.clique, stats)
        }
        Some(strategy) => {
            let skeleton_config = SkeletonConfig {
                strategy,
                ..config.skeleton.clone()
            };
            let outcome = skeleton::run(Arc::new(internal), &skeleton_config)?;
            (outcome.clique, outcome.stats)
        }
    };

    let mut clique = perm.map_to_original(&clique);
    clique.sort_unstable();

    let valid = match check_clique(graph, &clique) {
        Ok(()) => true,
        Err(e) => {
            log::error!("{} returned an invalid clique: {e}", config.algorithm);
            false
        }
    };

    let elapsed = start.elapsed();
    log::info!(
        "{} search finished: size={} nodes={} in {:.3}s",
        config.algorithm,
        clique.len(),
        stats.nodes,
        elapsed.as_secs_f64()
    );

    Ok(SearchOutcome {
        size: clique.len(),
        clique,
        elapsed,
        valid,
        stats,
    })
}

// ============================================================================
// Tests
// ============================================================================
