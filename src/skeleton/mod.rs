//! Parallel maximum clique over the work-stealing [`scheduler`].
//!
//! Every strategy runs the same depth-first branch and bound on each worker, driven by an
//! explicit stack of [`NodeGenerator`]s, and differs only in how work is created and how
//! improvements spread:
//!
//! | Strategy | Task creation | Incumbent exchange |
//! |---|---|---|
//! | [`Strategy::Broadcast`] | breadth-first split of the root to `spawn_depth` | shared atomic bound |
//! | [`Strategy::SafeExchange`] | breadth-first split of the root to `spawn_depth` | inbox messages |
//! | [`Strategy::SafeExchangeDynamic`] | root only, then on demand up to `target_tasks` | inbox messages |
//!
//! Pruning only ever uses the size of a clique some worker actually holds, so every strategy
//! returns a maximum clique.

pub mod scheduler;

use crate::error::{ConfigError, SkeletonError};
use crate::graph::BitGraph;
use crate::incumbent::LocalIncumbent;
use crate::node::{NodeGenerator, SearchNode, SearchSpace};
use crate::stats::SearchStats;
use crossbeam::utils::Backoff;
use scheduler::{Exchange, Scheduler, WorkerContext};
use std::sync::Arc;

// ============================================================================
// Configuration
// ============================================================================

/// How tasks are created and improvements shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Static split; improvements raise one shared bound.
    Broadcast,
    /// Static split; improvements travel as messages.
    SafeExchange,
    /// Tasks created on demand to keep `target_tasks` outstanding; improvements travel as messages.
    SafeExchangeDynamic,
}

impl Strategy {
    /// The incumbent exchange this strategy uses.
    pub fn exchange(self) -> Exchange {
        match self {
            Self::Broadcast => Exchange::SharedBound,
            Self::SafeExchange | Self::SafeExchangeDynamic => Exchange::Messages,
        }
    }

    /// Returns true if tasks are produced by splitting the root up front.
    pub fn splits_statically(self) -> bool {
        !matches!(self, Self::SafeExchangeDynamic)
    }
}

/// Parallel search parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkeletonConfig {
    /// Task creation and exchange strategy.
    pub strategy: Strategy,
    /// Worker threads.
    pub workers: usize,
    /// Static strategies split the root to this depth; the dynamic strategy only donates
    /// children of nodes shallower than this.
    pub spawn_depth: usize,
    /// Outstanding tasks the dynamic strategy tries to maintain. Required by it, ignored
    /// by the others.
    pub target_tasks: Option<usize>,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(4);

        Self {
            strategy: Strategy::SafeExchange,
            workers,
            spawn_depth: 2,
            target_tasks: None,
        }
    }
}

impl SkeletonConfig {
    /// Checks the configuration before any work starts.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for zero workers, or for the dynamic strategy without a
    /// positive target task count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.target_tasks == Some(0) {
            return Err(ConfigError::ZeroTargetTasks);
        }
        if self.strategy == Strategy::SafeExchangeDynamic && self.target_tasks.is_none() {
            return Err(ConfigError::MissingTargetTasks);
        }
        if self.strategy.splits_statically() && self.spawn_depth == 0 && self.workers > 1 {
            log::warn!(
                "spawn depth 0 with {:?} yields a single task; {} workers will mostly idle",
                self.strategy,
                self.workers
            );
        }
        Ok(())
    }
}

/// Result of a parallel run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkeletonOutcome {
    /// A maximum clique, internal ids.
    pub clique: Vec<usize>,
    /// Counters over the whole run.
    pub stats: SearchStats,
}

// ============================================================================
// Entry point
// ============================================================================

/// Finds a maximum clique of `graph` with the configured strategy.
///
/// # Errors
/// Returns [`SkeletonError::Config`] for an invalid configuration, or a transport, pool, or
/// worker failure.
pub fn run(graph: Arc<BitGraph>, config: &SkeletonConfig) -> Result<SkeletonOutcome, SkeletonError> {
    config.validate()?;

    let space = Arc::new(SearchSpace::new(graph));
    let mut scheduler = Scheduler::new(config.workers, config.strategy.exchange());
    scheduler.register(Arc::clone(&space));

    log::info!(
        "{:?} search: {} vertices, {} workers, spawn depth {}",
        config.strategy,
        space.graph().order(),
        config.workers,
        config.spawn_depth
    );

    let mut seed = LocalIncumbent::new();
    let frontier = if config.strategy.splits_statically() {
        space.split(space.root(), config.spawn_depth, &mut seed)
    } else {
        vec![space.root()]
    };
    log::debug!(
        "seeding {} tasks, incumbent {} after split",
        frontier.len(),
        seed.size()
    );
    // Every worker starts from `seed`, so it is never published.
    for node in &frontier {
        scheduler.spawn(node)?;
    }

    let policy = Policy {
        donation: match (config.strategy, config.target_tasks) {
            (Strategy::SafeExchangeDynamic, Some(target)) => Some(Donation {
                target,
                max_depth: config.spawn_depth,
            }),
            _ => None,
        },
    };

    let finals = scheduler.execute(|ctx| Explorer::new(policy, &seed).run(ctx))?;

    let clique = finals
        .into_iter()
        .chain(std::iter::once(seed))
        .max_by_key(|inc| inc.clique().len())
        .map(LocalIncumbent::into_clique)
        .unwrap_or_default();

    let stats = scheduler.stats();
    log::info!(
        "{:?} search finished: size={} nodes={} spawned={} steals={} messages={}",
        config.strategy,
        clique.len(),
        stats.nodes,
        stats.spawned,
        stats.steals,
        stats.messages
    );
    Ok(SkeletonOutcome { clique, stats })
}

// ============================================================================
// Worker
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Donation {
    target: usize,
    max_depth: usize,
}

#[derive(Clone, Copy, Debug)]
struct Policy {
    donation: Option<Donation>,
}

/// One worker's depth-first search state, reused across the tasks it runs.
struct Explorer {
    policy: Policy,
    incumbent: LocalIncumbent,
    stack: Vec<NodeGenerator>,
    nodes: u64,
    prunes: u64,
}

impl Explorer {
    fn new(policy: Policy, seed: &LocalIncumbent) -> Self {
        Self {
            policy,
            incumbent: seed.clone(),
            stack: Vec::new(),
            nodes: 0,
            prunes: 0,
        }
    }

    fn run(mut self, ctx: &mut WorkerContext<'_>) -> Result<LocalIncumbent, SkeletonError> {
        let backoff = Backoff::new();
        loop {
            match ctx.next_task() {
                Some(task) => {
                    backoff.reset();
                    let result = task.node().and_then(|node| self.run_task(ctx, node));
                    ctx.complete(&task);
                    result?;
                }
                None if ctx.is_quiescent() => break,
                None => ctx.idle(&backoff),
            }
        }

        ctx.record_work(self.nodes, self.prunes);
        log::debug!(
            "worker {} done: nodes={} prunes={} best={}",
            ctx.id(),
            self.nodes,
            self.prunes,
            self.incumbent.clique().len()
        );
        Ok(self.incumbent)
    }

    fn run_task(&mut self, ctx: &WorkerContext<'_>, node: SearchNode) -> Result<(), SkeletonError> {
        self.sync(ctx);
        self.visit(ctx, node);

        while !self.stack.is_empty() {
            if ctx.is_stopped() {
                self.stack.clear();
                break;
            }
            self.sync(ctx);
            if let Some(donation) = self.policy.donation {
                self.donate(ctx, donation)?;
            }

            let incumbent = self.incumbent.size();
            let child = self
                .stack
                .last_mut()
                .and_then(|generator| generator.next_child(incumbent));
            match child {
                Some(child) => self.visit(ctx, child),
                None => {
                    self.stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Records `node`'s clique and pushes its children unless the bound rules it out.
    fn visit(&mut self, ctx: &WorkerContext<'_>, node: SearchNode) {
        self.nodes += 1;
        if self.incumbent.offer(&node.clique) {
            ctx.raise_incumbent(&node.clique);
        }
        if node.is_leaf() {
            return;
        }
        let incumbent = self.incumbent.size();
        if SearchSpace::prunable(&node, incumbent) {
            self.prunes += 1;
            return;
        }
        self.stack.push(ctx.space().children(&node, incumbent));
    }

    /// Folds in whatever other workers have published.
    fn sync(&mut self, ctx: &WorkerContext<'_>) {
        match ctx.exchange() {
            Exchange::SharedBound => self.incumbent.raise_size(ctx.shared_bound()),
            Exchange::Messages => {
                for update in ctx.drain_inbox() {
                    self.incumbent.observe(update);
                }
            }
        }
    }

    /// Spawns children of the shallowest eligible generator while too few tasks are waiting to
    /// be picked up.
    fn donate(&mut self, ctx: &WorkerContext<'_>, donation: Donation) -> Result<(), SkeletonError> {
        let queued = ctx.queued();
        if queued >= donation.target {
            return Ok(());
        }
        let incumbent = self.incumbent.size();
        let Some(generator) = self
            .stack
            .iter_mut()
            .find(|g| g.depth() < donation.max_depth && !g.is_exhausted())
        else {
            return Ok(());
        };
        for child in generator.take(donation.target - queued, incumbent) {
            ctx.spawn(&child)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
