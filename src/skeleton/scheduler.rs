//! In-process scheduling substrate: a fixed worker pool over work-stealing deques.
//!
//! Tasks are [`SearchNode`]s encoded with bincode. Each worker owns a LIFO deque, so its own
//! freshly spawned (deepest) tasks come back first, while thieves take from the other end and
//! get the oldest, largest subtrees. Seed tasks go through a shared [`Injector`].
//!
//! Termination is a single outstanding-task counter, incremented before a task is queued and
//! decremented once its owner has finished it (after any tasks it spawned were counted). The
//! search is quiescent when the counter reads zero. A second counter tracks only the tasks still
//! sitting in a queue, which is what an idle worker can actually pick up.
//!
//! Incumbent improvements travel one of two ways, chosen by [`Exchange`]: a process-wide
//! [`SharedBound`] every worker reads directly, or per-worker inbox channels that carry
//! [`IncumbentUpdate`] messages.

use crate::error::SkeletonError;
use crate::incumbent::{IncumbentUpdate, SharedBound};
use crate::node::{SearchNode, SearchSpace};
use crate::stats::{AtomicStats, SearchStats};
use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::deque::{Injector, Steal, Stealer, Worker};
use crossbeam::utils::Backoff;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How incumbent improvements reach other workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// Raise a shared atomic bound that every worker polls.
    SharedBound,
    /// Send an [`IncumbentUpdate`] to every other worker's inbox.
    Messages,
}

/// Identifies a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    /// Unique within one scheduler.
    pub id: u64,
    /// Depth of the task's root node.
    pub depth: usize,
}

/// A queued unit of work: one encoded subtree root.
#[derive(Debug)]
pub struct Task {
    handle: TaskHandle,
    bytes: Vec<u8>,
}

impl Task {
    /// The handle returned when this task was spawned.
    #[inline]
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Decodes the subtree root.
    ///
    /// # Errors
    /// Returns [`SkeletonError::Codec`] if the payload does not decode to a valid node.
    pub fn node(&self) -> Result<SearchNode, SkeletonError> {
        Ok(SearchNode::decode(&self.bytes)?)
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// The part of the scheduler every worker thread sees.
struct Shared {
    space: Option<Arc<SearchSpace>>,
    exchange: Exchange,
    injector: Injector<Task>,
    stealers: Vec<Stealer<Task>>,
    inboxes: Vec<Sender<IncumbentUpdate>>,
    outstanding: AtomicUsize,
    queued: AtomicUsize,
    next_id: AtomicU64,
    bound: SharedBound,
    stop: AtomicBool,
    stats: AtomicStats,
}

impl Shared {
    fn encode(&self, node: &SearchNode) -> Result<Task, SkeletonError> {
        let bytes = node.encode()?;
        let handle = TaskHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            depth: node.depth,
        };
        Ok(Task { handle, bytes })
    }

    /// Counts a task as outstanding and queued. Must happen before the task becomes visible.
    #[inline]
    fn announce(&self, handle: TaskHandle) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        self.queued.fetch_add(1, Ordering::AcqRel);
        self.stats.inc_spawned();
        log::trace!("spawn task {} at depth {}", handle.id, handle.depth);
    }

    fn raise_incumbent(&self, worker: usize, clique: &[usize]) -> bool {
        if !self.bound.raise(clique.len()) {
            return false;
        }
        self.stats.inc_improvements();
        log::debug!("worker {worker} raised incumbent to {}", clique.len());

        if self.exchange == Exchange::Messages {
            let update = IncumbentUpdate {
                origin: worker,
                clique: clique.to_vec(),
            };
            let sent = self
                .inboxes
                .iter()
                .enumerate()
                .filter(|&(peer, _)| peer != worker)
                .filter(|(_, inbox)| inbox.send(update.clone()).is_ok())
                .count();
            self.stats.add_messages(sent as u64);
        }
        true
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Work-stealing pool for one search.
pub struct Scheduler {
    shared: Shared,
    deques: Vec<Worker<Task>>,
    receivers: Vec<Receiver<IncumbentUpdate>>,
}

impl Scheduler {
    /// Creates a scheduler for `workers` threads. A search space must be registered before
    /// [`Scheduler::execute`].
    pub fn new(workers: usize, exchange: Exchange) -> Self {
        let deques: Vec<Worker<Task>> = (0..workers).map(|_| Worker::new_lifo()).collect();
        let stealers = deques.iter().map(Worker::stealer).collect();
        let (inboxes, receivers): (Vec<Sender<IncumbentUpdate>>, Vec<Receiver<IncumbentUpdate>>) =
            (0..workers).map(|_| channel::unbounded()).unzip();

        Self {
            shared: Shared {
                space: None,
                exchange,
                injector: Injector::new(),
                stealers,
                inboxes,
                outstanding: AtomicUsize::new(0),
                queued: AtomicUsize::new(0),
                next_id: AtomicU64::new(0),
                bound: SharedBound::new(0),
                stop: AtomicBool::new(false),
                stats: AtomicStats::new(),
            },
            deques,
            receivers,
        }
    }

    /// Sets the search space tasks are expanded against, replacing any earlier one.
    pub fn register(&mut self, space: Arc<SearchSpace>) {
        self.shared.space = Some(space);
    }

    /// The registered search space, if any.
    pub fn space(&self) -> Option<&Arc<SearchSpace>> {
        self.shared.space.as_ref()
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.deques.len()
    }

    /// Tasks spawned but not yet finished.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    /// Tasks waiting in a queue, not yet taken by any worker.
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Acquire)
    }

    /// Queues `node` on the shared injector.
    ///
    /// # Errors
    /// Returns [`SkeletonError::Codec`] if the node cannot be encoded.
    pub fn spawn(&self, node: &SearchNode) -> Result<TaskHandle, SkeletonError> {
        let task = self.shared.encode(node)?;
        let handle = task.handle;
        self.shared.announce(handle);
        self.shared.injector.push(task);
        Ok(handle)
    }

    /// Publishes a clique found by `worker`. Returns true if it beat everything published so far.
    pub fn raise_incumbent(&self, worker: usize, clique: &[usize]) -> bool {
        self.shared.raise_incumbent(worker, clique)
    }

    /// Best size published so far.
    pub fn incumbent_size(&self) -> usize {
        self.shared.bound.get()
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SearchStats {
        self.shared.stats.snapshot()
    }

    /// Runs `work` once per worker on a dedicated pool and collects the results by worker id.
    ///
    /// A worker that fails or panics stops the others; the first error by worker id is
    /// returned.
    ///
    /// # Errors
    /// Returns [`SkeletonError::Unregistered`] if no search space was registered, the pool
    /// construction error, or the first worker error.
    pub fn execute<R, F>(&mut self, work: F) -> Result<Vec<R>, SkeletonError>
    where
        R: Send,
        F: Fn(&mut WorkerContext<'_>) -> Result<R, SkeletonError> + Sync,
    {
        let space = self
            .shared
            .space
            .as_deref()
            .ok_or(SkeletonError::Unregistered)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers())
            .thread_name(|i| format!("clique-worker-{i}"))
            .build()?;

        let shared = &self.shared;
        let slots: Vec<(usize, Worker<Task>, Receiver<IncumbentUpdate>)> = self
            .deques
            .drain(..)
            .zip(self.receivers.drain(..))
            .enumerate()
            .map(|(id, (deque, inbox))| (id, deque, inbox))
            .collect();

        let results: Vec<Result<R, SkeletonError>> = pool.install(|| {
            slots
                .into_par_iter()
                .map(|(id, deque, inbox)| {
                    let mut ctx = WorkerContext {
                        id,
                        space,
                        shared,
                        deque,
                        inbox,
                    };
                    let result = panic::catch_unwind(AssertUnwindSafe(|| work(&mut ctx)))
                        .unwrap_or(Err(SkeletonError::WorkerPanicked { worker: id }));
                    if result.is_err() {
                        shared.stop.store(true, Ordering::Release);
                    }
                    result
                })
                .collect()
        });

        results.into_iter().collect()
    }
}

// ============================================================================
// WorkerContext
// ============================================================================

/// A worker's handle on the scheduler: its own deque and inbox plus the shared queues.
pub struct WorkerContext<'s> {
    id: usize,
    space: &'s SearchSpace,
    shared: &'s Shared,
    deque: Worker<Task>,
    inbox: Receiver<IncumbentUpdate>,
}

impl WorkerContext<'_> {
    /// This worker's id, `0..workers`.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// The registered search space.
    #[inline]
    pub fn space(&self) -> &SearchSpace {
        self.space
    }

    /// How improvements are exchanged.
    #[inline]
    pub fn exchange(&self) -> Exchange {
        self.shared.exchange
    }

    /// Tasks spawned but not yet finished, across all workers.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    /// Tasks waiting in a queue across all workers; running tasks are not counted.
    #[inline]
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Acquire)
    }

    /// Queues `node` on this worker's deque, where idle workers can steal it.
    ///
    /// # Errors
    /// Returns [`SkeletonError::Codec`] if the node cannot be encoded.
    pub fn spawn(&self, node: &SearchNode) -> Result<TaskHandle, SkeletonError> {
        let task = self.shared.encode(node)?;
        let handle = task.handle;
        self.shared.announce(handle);
        self.deque.push(task);
        Ok(handle)
    }

    /// Takes the next task: own deque first, then the injector, then other workers.
    pub fn next_task(&self) -> Option<Task> {
        let task = self.deque.pop().or_else(|| loop {
            let injected = self.shared.injector.steal_batch_and_pop(&self.deque);
            if let Steal::Success(task) = injected {
                break Some(task);
            }
            match self.steal_from_peers() {
                Steal::Success(task) => {
                    self.shared.stats.inc_steals();
                    break Some(task);
                }
                Steal::Empty if !injected.is_retry() => break None,
                _ => {}
            }
        })?;
        self.shared.queued.fetch_sub(1, Ordering::AcqRel);
        Some(task)
    }

    /// One pass over every other worker's deque. Yields the first task found, or
    /// [`Steal::Retry`] if any peer was contended and nothing was found.
    fn steal_from_peers(&self) -> Steal<Task> {
        self.shared
            .stealers
            .iter()
            .enumerate()
            .filter(|&(peer, _)| peer != self.id)
            .map(|(_, stealer)| stealer.steal())
            .collect()
    }

    /// Marks `task` finished.
    #[inline]
    pub fn complete(&self, task: &Task) {
        let before = self.shared.outstanding.fetch_sub(1, Ordering::AcqRel);
        if before == 0 {
            crate::error::invariant_violation("outstanding task count underflow");
        }
        log::trace!("worker {} finished task {}", self.id, task.handle.id);
    }

    /// Returns true once no work remains anywhere, or the run was aborted.
    #[inline]
    pub fn is_quiescent(&self) -> bool {
        self.is_stopped() || self.outstanding() == 0
    }

    /// Returns true if another worker failed and the run is being torn down.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    /// Waits briefly before polling for work again.
    pub fn idle(&self, backoff: &Backoff) {
        if backoff.is_completed() {
            thread::sleep(Duration::from_micros(50));
        } else {
            backoff.snooze();
        }
    }

    /// Publishes a clique this worker found.
    #[inline]
    pub fn raise_incumbent(&self, clique: &[usize]) -> bool {
        self.shared.raise_incumbent(self.id, clique)
    }

    /// Current value of the shared bound.
    #[inline]
    pub fn shared_bound(&self) -> usize {
        self.shared.bound.get()
    }

    /// Drains pending incumbent messages.
    pub fn drain_inbox(&self) -> impl Iterator<Item = IncumbentUpdate> + '_ {
        self.inbox.try_iter()
    }

    /// Adds this worker's locally counted work to the shared statistics.
    pub fn record_work(&self, nodes: u64, prunes: u64) {
        self.shared.stats.add_work(nodes, prunes);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BitGraph;

    fn space() -> Arc<SearchSpace> {
        Arc::new(SearchSpace::new(Arc::new(BitGraph::complete(6))))
    }

    fn scheduler(workers: usize, exchange: Exchange) -> Scheduler {
        let mut s = Scheduler::new(workers, exchange);
        s.register(space());
        s
    }

    /// Pops tasks until quiescent, spawning every child up to `max_depth`.
    fn drain(ctx: &mut WorkerContext<'_>, max_depth: usize) -> Result<u64, SkeletonError> {
        let backoff = Backoff::new();
        let mut processed = 0;
        loop {
            match ctx.next_task() {
                Some(task) => {
                    backoff.reset();
                    let node = task.node()?;
                    if node.depth < max_depth {
                        for child in ctx.space().expand(&node, 0).children {
                            ctx.spawn(&child)?;
                        }
                    }
                    processed += 1;
                    ctx.complete(&task);
                }
                None if ctx.is_quiescent() => return Ok(processed),
                None => ctx.idle(&backoff),
            }
        }
    }

    #[test]
    fn every_spawned_task_runs_exactly_once() {
        let mut s = scheduler(4, Exchange::SharedBound);
        let root = space().root();
        s.spawn(&root).unwrap();

        let counts = s.execute(|ctx| drain(ctx, 3)).unwrap();
        // K6 below depth 3: 1 + 6 + 15 + 20 nodes, one task each.
        assert_eq!(counts.iter().sum::<u64>(), 42);
        assert_eq!(s.outstanding(), 0);
        assert_eq!(s.queued(), 0);
        assert_eq!(s.stats().spawned, 42);
    }

    #[test]
    fn idle_workers_steal_from_any_peer() {
        // Worker 2 queues tasks on its own deque and never runs them, so workers 0 and 1
        // can only get them by stealing from the last peer in their scan.
        const TASKS: usize = 6;
        let mut s = scheduler(3, Exchange::SharedBound);
        let taken = AtomicUsize::new(0);
        let deadline = std::time::Instant::now() + Duration::from_secs(10);

        let counts = s
            .execute(|ctx| {
                let backoff = Backoff::new();
                if ctx.id() == 2 {
                    let root = ctx.space().root();
                    for _ in 0..TASKS {
                        ctx.spawn(&root)?;
                    }
                }
                let mut mine = 0;
                while taken.load(Ordering::Acquire) < TASKS && std::time::Instant::now() < deadline {
                    if ctx.id() == 2 {
                        ctx.idle(&backoff);
                        continue;
                    }
                    match ctx.next_task() {
                        Some(task) => {
                            ctx.complete(&task);
                            mine += 1;
                            taken.fetch_add(1, Ordering::AcqRel);
                        }
                        None => ctx.idle(&backoff),
                    }
                }
                Ok(mine)
            })
            .unwrap();

        assert_eq!(counts[2], 0);
        assert_eq!(counts[0] + counts[1], TASKS);
        assert_eq!(s.stats().steals, TASKS as u64);
        assert_eq!(s.outstanding(), 0);
        assert_eq!(s.queued(), 0);
    }

    #[test]
    fn queued_excludes_running_tasks() {
        let mut s = scheduler(1, Exchange::SharedBound);
        let root = space().root();
        s.spawn(&root).unwrap();
        s.spawn(&root).unwrap();
        assert_eq!(s.queued(), 2);

        let seen = s
            .execute(|ctx| {
                let task = ctx.next_task().expect("two tasks queued");
                let during = (ctx.queued(), ctx.outstanding());
                ctx.complete(&task);
                Ok(during)
            })
            .unwrap();
        assert_eq!(seen, vec![(1, 2)]);
        assert_eq!(s.queued(), 1);
        assert_eq!(s.outstanding(), 1);
    }

    #[test]
    fn execute_requires_a_registered_space() {
        let mut s = Scheduler::new(2, Exchange::SharedBound);
        assert!(s.space().is_none());
        let result: Result<Vec<()>, _> = s.execute(|_| Ok(()));
        assert!(matches!(result, Err(SkeletonError::Unregistered)));

        s.register(space());
        assert!(s.space().is_some());
        assert_eq!(s.execute(|_| Ok(())).unwrap(), vec![(), ()]);
    }

    #[test]
    fn empty_scheduler_terminates_immediately() {
        let mut s = scheduler(3, Exchange::Messages);
        let counts = s.execute(|ctx| drain(ctx, 0)).unwrap();
        assert_eq!(counts, vec![0, 0, 0]);
    }

    #[test]
    fn task_handles_are_unique() {
        let s = scheduler(1, Exchange::SharedBound);
        let root = space().root();
        let a = s.spawn(&root).unwrap();
        let b = s.spawn(&root).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(s.outstanding(), 2);
    }

    #[test]
    fn messages_reach_every_other_worker() {
        let mut s = scheduler(3, Exchange::Messages);
        let received = s
            .execute(|ctx| {
                if ctx.id() == 0 {
                    assert!(ctx.raise_incumbent(&[0, 1, 2]));
                    assert!(!ctx.raise_incumbent(&[3, 4]));
                }
                // Wait for worker 0's update; it is sent exactly once.
                let backoff = Backoff::new();
                loop {
                    if ctx.id() == 0 || ctx.shared_bound() == 3 {
                        break;
                    }
                    ctx.idle(&backoff);
                }
                let mut seen = Vec::new();
                while seen.is_empty() && ctx.id() != 0 {
                    seen.extend(ctx.drain_inbox());
                }
                Ok(seen)
            })
            .unwrap();

        assert!(received[0].is_empty());
        for inbox in &received[1..] {
            assert_eq!(inbox.len(), 1);
            assert_eq!(inbox[0].origin, 0);
            assert_eq!(inbox[0].clique, vec![0, 1, 2]);
        }
        let stats = s.stats();
        assert_eq!(stats.improvements, 1);
        assert_eq!(stats.messages, 2);
    }

    #[test]
    fn shared_bound_exchange_sends_no_messages() {
        let s = scheduler(2, Exchange::SharedBound);
        assert!(s.raise_incumbent(1, &[0, 1]));
        assert_eq!(s.incumbent_size(), 2);
        assert_eq!(s.stats().messages, 0);
    }

    #[test]
    fn worker_panic_is_reported() {
        let mut s = scheduler(2, Exchange::SharedBound);
        let result: Result<Vec<()>, _> = s.execute(|ctx| {
            if ctx.id() == 1 {
                panic!("worker failure");
            }
            Ok(())
        });
        assert!(matches!(result, Err(SkeletonError::WorkerPanicked { worker: 1 })));
    }

    #[test]
    fn corrupt_task_surfaces_codec_error() {
        let task = Task {
            handle: TaskHandle { id: 0, depth: 0 },
            bytes: vec![0xFF; 3],
        };
        assert!(matches!(task.node(), Err(SkeletonError::Codec(_))));
    }
}
