//! Bounded, paced dispatch of async work items

use super::cancel::CancelToken;
use super::pacer::Pacer;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Configuration for bounded dispatch
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of tasks in flight at once
    pub max_concurrency: usize,
    /// Pause after every N dispatched tasks (0 = never pause)
    pub batch_size: usize,
    /// Length of the pause between batches
    pub batch_pause: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            batch_size: 20,
            batch_pause: Duration::from_millis(250),
        }
    }
}

/// What the scheduler should do after a result has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop dispatching; in-flight work is detached and its results dropped
    Halt,
}

/// Outcome of one [`Scheduler::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    /// Results handed to the result callback
    pub completed: usize,
    /// Items never dispatched
    pub skipped: usize,
    pub halted: bool,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn finished_all(&self) -> bool {
        !self.halted && !self.cancelled && self.skipped == 0
    }
}

/// Bounded, paced async work dispatcher
///
/// Items are dispatched in insertion order onto a [`JoinSet`]; completions are
/// handled as they arrive, so result order follows completion order.
pub struct Scheduler {
    config: SchedulerConfig,
    pacer: Arc<Pacer>,
    cancel: CancelToken,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, pacer: Arc<Pacer>, cancel: CancelToken) -> Self {
        Self {
            config,
            pacer,
            cancel,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run `worker` over every item, feeding each result to `on_result`
    ///
    /// `on_result` runs on the calling task, one result at a time, so it can
    /// mutate shared state without further coordination.
    pub async fn run<T, R, F, Fut, C>(&self, items: Vec<T>, worker: F, mut on_result: C) -> RunSummary
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        C: FnMut(R) -> Flow,
    {
        let total = items.len();
        let limit = self.config.max_concurrency.max(1);
        let mut pending = items.into_iter();
        let mut in_flight: JoinSet<R> = JoinSet::new();
        let mut summary = RunSummary::default();

        tracing::debug!(
            "Dispatching {} items (concurrency {}, batch {} / {:?})",
            total,
            limit,
            self.config.batch_size,
            self.config.batch_pause
        );

        'run: loop {
            // Top up the in-flight set
            while in_flight.len() < limit {
                if self.cancel.is_cancelled() {
                    summary.cancelled = true;
                    break 'run;
                }
                let Some(item) = pending.next() else {
                    break;
                };

                if self.at_batch_boundary(summary.dispatched) {
                    tracing::trace!("Batch boundary at {}, pausing", summary.dispatched);
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.batch_pause) => {}
                        _ = self.cancel.cancelled() => {
                            summary.cancelled = true;
                            break 'run;
                        }
                    }
                }

                tokio::select! {
                    _ = self.pacer.wait() => {}
                    _ = self.cancel.cancelled() => {
                        summary.cancelled = true;
                        break 'run;
                    }
                }
                if self.cancel.is_cancelled() {
                    summary.cancelled = true;
                    break 'run;
                }

                in_flight.spawn(worker(item));
                summary.dispatched += 1;
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    summary.cancelled = true;
                    break 'run;
                }
                joined = in_flight.join_next() => match joined {
                    Some(Ok(result)) => {
                        summary.completed += 1;
                        if on_result(result) == Flow::Halt {
                            summary.halted = true;
                            break 'run;
                        }
                    }
                    Some(Err(err)) => {
                        tracing::error!("Worker task failed: {}", err);
                    }
                    None => break,
                },
            }
        }

        if summary.halted || summary.cancelled {
            // Let in-flight requests finish on their own; nobody reads them
            in_flight.detach_all();
        }
        summary.skipped = total - summary.dispatched;

        tracing::debug!(
            "Dispatch finished: {} dispatched, {} completed, {} skipped{}{}",
            summary.dispatched,
            summary.completed,
            summary.skipped,
            if summary.halted { ", halted" } else { "" },
            if summary.cancelled { ", cancelled" } else { "" }
        );
        summary
    }

    fn at_batch_boundary(&self, dispatched: usize) -> bool {
        self.config.batch_size > 0
            && !self.config.batch_pause.is_zero()
            && dispatched > 0
            && dispatched % self.config.batch_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn scheduler(max_concurrency: usize, cancel: CancelToken) -> Scheduler {
        Scheduler::new(
            SchedulerConfig {
                max_concurrency,
                batch_size: 0,
                batch_pause: Duration::ZERO,
            },
            Arc::new(Pacer::new()),
            cancel,
        )
    }

    #[tokio::test]
    async fn test_never_exceeds_concurrency() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let sched = scheduler(3, CancelToken::new());

        let summary = sched
            .run(
                (0..12).collect(),
                |n: u64| {
                    let active = active.clone();
                    let peak = peak.clone();
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5 + n % 3)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        n
                    }
                },
                |_| Flow::Continue,
            )
            .await;

        assert_eq!(summary.dispatched, 12);
        assert_eq!(summary.completed, 12);
        assert!(summary.finished_all());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_dispatches_in_insertion_order() {
        let started = Arc::new(Mutex::new(Vec::new()));
        let sched = scheduler(1, CancelToken::new());

        sched
            .run(
                vec!["a", "b", "c"],
                |item| {
                    let started = started.clone();
                    async move {
                        started.lock().unwrap().push(item);
                    }
                },
                |_| Flow::Continue,
            )
            .await;

        assert_eq!(*started.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_halt_stops_dispatch() {
        let sched = scheduler(1, CancelToken::new());
        let mut seen = Vec::new();

        let summary = sched
            .run(
                (0..10).collect(),
                |n: u32| async move { n },
                |n: u32| {
                    seen.push(n);
                    if n == 2 { Flow::Halt } else { Flow::Continue }
                },
            )
            .await;

        assert!(summary.halted);
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(summary.dispatched, 3);
        assert_eq!(summary.skipped, 7);
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_results() {
        let cancel = CancelToken::new();
        let sched = scheduler(2, cancel.clone());
        let handled = AtomicUsize::new(0);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let summary = sched
            .run(
                (0..6).collect(),
                |n: u32| async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    n
                },
                |_| {
                    handled.fetch_add(1, Ordering::SeqCst);
                    Flow::Continue
                },
            )
            .await;

        assert!(summary.cancelled);
        assert_eq!(handled.load(Ordering::SeqCst), 0);
        assert_eq!(summary.dispatched, 2);
        assert_eq!(summary.skipped, 4);
    }

    #[tokio::test]
    async fn test_batch_pause_applies_between_batches() {
        let sched = Scheduler::new(
            SchedulerConfig {
                max_concurrency: 4,
                batch_size: 2,
                batch_pause: Duration::from_millis(30),
            },
            Arc::new(Pacer::new()),
            CancelToken::new(),
        );

        let started = std::time::Instant::now();
        let summary = sched
            .run((0..5).collect(), |n: u32| async move { n }, |_| Flow::Continue)
            .await;

        assert_eq!(summary.completed, 5);
        // Pauses before the 3rd and 5th dispatch
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let summary = scheduler(4, CancelToken::new())
            .run(Vec::<u8>::new(), |n| async move { n }, |_| Flow::Continue)
            .await;
        assert_eq!(summary, RunSummary::default());
    }
}
