//! # Maximum Clique Search
//!
//! Exact maximum clique of an undirected graph by bit-parallel branch and bound.
//!
//! This crate provides:
//! - A `u64`-word bitset graph where candidate filtering is a word-wise AND.
//! - A sequential depth-first solver with either a candidate-count bound or a greedy
//!   **colouring** bound (Tomita-style: the colouring also fixes the branching order).
//! - A parallel skeleton that runs the same search over a work-stealing pool, with three
//!   strategies for creating tasks and sharing the incumbent.
//!
//! ## Quick Start
//!
//! ```
//! use maxclique::graph::BitGraph;
//! use maxclique::search::{run, SearchConfig};
//!
//! // Two triangles sharing vertex 2.
//! let g = BitGraph::build(5, &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (2, 4)]).unwrap();
//!
//! let outcome = run(&g, &SearchConfig::default()).unwrap();
//! assert_eq!(outcome.size, 3);
//! assert!(outcome.valid);
//! ```
//!
//! ## Parallel Search
//!
//! ```
//! use maxclique::graph::BitGraph;
//! use maxclique::search::{run, Algorithm, SearchConfig};
//! use maxclique::skeleton::SkeletonConfig;
//!
//! let cfg = SearchConfig {
//!     algorithm: Algorithm::SafeExchangeDynamic,
//!     skeleton: SkeletonConfig {
//!         workers: 4,
//!         spawn_depth: 3,
//!         target_tasks: Some(16),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let outcome = run(&BitGraph::complete(12), &cfg).unwrap();
//! assert_eq!(outcome.clique, (0..12).collect::<Vec<_>>());
//! ```
//!
//! ## Reading Graphs
//!
//! ```
//! use maxclique::dimacs::parse_dimacs;
//!
//! let g = parse_dimacs("p edge 3 2\ne 1 2\ne 2 3\n").unwrap().into_graph().unwrap();
//! assert_eq!(g.edge_count(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`bitset`]: Fixed-width bit vectors.
//! - [`graph`]: Immutable adjacency bitsets.
//! - [`dimacs`]: DIMACS and adjacency-matrix parsers.
//! - [`ordering`]: Degree ordering and relabelling.
//! - [`coloring`]: Greedy colouring bound.
//! - [`solver`]: Sequential branch and bound.
//! - [`incumbent`]: Monotone best-so-far clique.
//! - [`node`]: Search nodes as transportable values, and their child generators.
//! - [`skeleton`]: Parallel strategies over a work-stealing scheduler.
//! - [`search`]: Run facade.
//! - [`validate`]: Independent clique checks and bundled reference instances.
//!
//! ## Performance Notes
//!
//! - Relabelling by degree (on by default) puts high-degree vertices last, where the
//!   solvers branch first.
//! - For maximum performance, compile with: `RUSTFLAGS="-C target-cpu=native" cargo build --release`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for matrix indexing
#![allow(clippy::doc_markdown)]
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod bitset;
pub mod coloring;
pub mod dimacs;
pub mod error;
pub mod graph;
pub mod incumbent;
pub mod node;
pub mod ordering;
pub mod search;
pub mod skeleton;
pub mod solver;
pub mod stats;
pub mod validate;

pub use error::{Error, Result};

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::bitset::BitSet;
    pub use crate::dimacs::{parse_dimacs, parse_matrix, read_graph, Format};
    pub use crate::graph::BitGraph;
    pub use crate::search::{run, Algorithm, SearchConfig, SearchOutcome};
    pub use crate::skeleton::{SkeletonConfig, Strategy};
    pub use crate::solver::{max_clique, Variant};
    pub use crate::validate::check_clique;
}
