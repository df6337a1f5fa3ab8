//! Error types shared across the crate.

use thiserror::Error;

/// Rejected edge lists passed to [`crate::graph::BitGraph::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum GraphError {
    /// An endpoint is not in `0..n`.
    #[error("edge ({u}, {v}) has an endpoint outside 0..{n}")]
    VertexOutOfRange { u: usize, v: usize, n: usize },

    /// An edge joins a vertex to itself.
    #[error("self-loop at vertex {vertex}")]
    SelfLoop { vertex: usize },
}

/// Malformed graph text.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("failed to read graph input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("no problem line ('p edge N M') found")]
    MissingProblemLine,

    #[error("adjacency matrix is empty")]
    EmptyMatrix,

    #[error("adjacency matrix is not symmetric at ({i}, {j})")]
    NotSymmetric { i: usize, j: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Invalid search configuration, detected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("the dynamic strategy requires a target task count")]
    MissingTargetTasks,

    #[error("target task count must be positive")]
    ZeroTargetTasks,

    #[error("worker count must be positive")]
    ZeroWorkers,
}

/// Failures of the parallel skeleton.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SkeletonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("task transport failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("no search space registered with the scheduler")]
    Unregistered,

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

/// Crate-level error.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Aborts on a broken internal invariant.
///
/// A violated bound or colouring invariant means pruning may already have discarded the true
/// maximum; continuing could report a wrong answer, so this never returns.
#[cold]
#[track_caller]
pub fn invariant_violation(what: &str) -> ! {
    log::error!("internal invariant violated: {what}");
    panic!("internal invariant violated: {what}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_messages() {
        let e = GraphError::VertexOutOfRange { u: 1, v: 9, n: 5 };
        assert_eq!(e.to_string(), "edge (1, 9) has an endpoint outside 0..5");
        assert_eq!(GraphError::SelfLoop { vertex: 3 }.to_string(), "self-loop at vertex 3");
    }

    #[test]
    fn errors_convert_into_crate_error() {
        let e: Error = ConfigError::MissingTargetTasks.into();
        assert!(matches!(e, Error::Config(ConfigError::MissingTargetTasks)));

        let e: ParseError = GraphError::SelfLoop { vertex: 0 }.into();
        assert!(matches!(e, ParseError::Graph(_)));
    }

    #[test]
    #[should_panic(expected = "internal invariant violated")]
    fn invariant_violation_aborts() {
        invariant_violation("colour count exceeds candidate count");
    }
}
