//! Fixed-interval cycle scheduler.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, Notify, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::{
    DedupStore, JobSource, LinkResolver, Notification, NotificationSink, PipelineError,
    SettingsHandle, choose_link,
};

/// Default time between cycle starts (5 minutes).
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Whether a cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    Idle = 0,
    Running = 1,
}

impl From<u8> for SchedulerState {
    fn from(v: u8) -> Self {
        match v {
            1 => SchedulerState::Running,
            _ => SchedulerState::Idle,
        }
    }
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Listings returned by the provider.
    pub fetched: usize,
    /// Listings not seen before.
    pub new: usize,
    /// Notifications accepted by the sink.
    pub notified: usize,
    /// New jobs with no link to notify with.
    pub skipped: usize,
    /// Notifications the sink rejected.
    pub failed: usize,
    /// Whether the dedup state was written.
    pub persisted: bool,
}

/// Result of asking for a cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// The cycle ended early; nothing was notified or persisted.
    Failed(PipelineError),
    /// Another cycle was already running.
    Skipped,
}

/// Resets the scheduler to idle when a cycle ends, including on panic.
struct RunningGuard {
    state: Arc<AtomicU8>,
    idle: Arc<Notify>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.state
            .store(SchedulerState::Idle as u8, Ordering::SeqCst);
        self.idle.notify_waiters();
    }
}

/// Drives fetch, dedup, link resolution, notification and persistence.
pub struct Scheduler {
    source: Arc<dyn JobSource>,
    resolver: LinkResolver,
    sink: Arc<dyn NotificationSink>,
    store: DedupStore,
    settings: SettingsHandle,
    interval: Duration,
    state: Arc<AtomicU8>,
    idle: Arc<Notify>,
    /// Every ID seen by this process, kept even when persistence fails.
    seen: Mutex<HashSet<String>>,
}

impl Scheduler {
    /// Create a new scheduler with the default interval.
    pub fn new(
        source: Arc<dyn JobSource>,
        resolver: LinkResolver,
        sink: Arc<dyn NotificationSink>,
        store: DedupStore,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            source,
            resolver,
            sink,
            store,
            settings,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            state: Arc::new(AtomicU8::new(SchedulerState::Idle as u8)),
            idle: Arc::new(Notify::new()),
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Set the time between cycle starts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from(self.state.load(Ordering::SeqCst))
    }

    /// Run the scheduler loop until shutdown.
    ///
    /// The first cycle starts immediately. Shutdown is only observed between
    /// cycles, and `run` returns only after any in-flight cycle, including
    /// one started by [`Scheduler::trigger`], has finished persisting.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "scheduler starting");

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // Sender dropped counts as shutdown
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("scheduler received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        if self.state() == SchedulerState::Running {
            info!("waiting for in-flight cycle to finish");
        }
        self.wait_idle().await;

        info!("scheduler shut down gracefully");
    }

    /// Wait until no cycle is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a guard dropped in between is not missed
            notified.as_mut().enable();

            if self.state() == SchedulerState::Idle {
                return;
            }
            notified.await;
        }
    }

    /// Spawn a cycle in the background unless one is already running.
    ///
    /// Returns `false` if the trigger was dropped.
    pub fn trigger(self: &Arc<Self>) -> bool {
        let Some(guard) = self.try_begin() else {
            debug!("cycle already running, trigger dropped");
            return false;
        };

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            let outcome = scheduler.execute_cycle().await;
            log_outcome(&outcome);
        });
        true
    }

    /// Run one cycle now, unless one is already running.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("cycle already running, skipping");
            return CycleOutcome::Skipped;
        };

        let outcome = self.execute_cycle().await;
        log_outcome(&outcome);
        outcome
    }

    fn try_begin(&self) -> Option<RunningGuard> {
        self.state
            .compare_exchange(
                SchedulerState::Idle as u8,
                SchedulerState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .ok()
            .map(|_| RunningGuard {
                state: Arc::clone(&self.state),
                idle: Arc::clone(&self.idle),
            })
    }

    /// Execute a single cycle. Callers must hold the running guard.
    #[tracing::instrument(skip(self))]
    async fn execute_cycle(&self) -> CycleOutcome {
        let started_at = Utc::now();

        let mut seen: HashSet<String> = self.store.load().await;
        seen.extend(self.seen.lock().await.iter().cloned());
        let settings = self.settings.snapshot();
        let location = settings.effective_location();
        let query = settings.effective_query();
        let method = settings.link_method;

        info!(%location, %query, %method, seen = seen.len(), "cycle starting");

        let jobs = match self.source.fetch_latest(location, query).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!(error = %e, "failed to fetch jobs, ending cycle");
                return CycleOutcome::Failed(PipelineError::Fetch(e));
            }
        };

        let mut report = CycleReport {
            started_at,
            fetched: jobs.len(),
            ..Default::default()
        };

        for mut job in jobs {
            if !seen.insert(job.job_id.clone()) {
                continue;
            }
            report.new += 1;
            info!(job_id = %job.job_id, title = %job.title, "new job found");

            let resolved = match self
                .resolver
                .resolve(&job.job_id, &job.query_excerpt, method)
                .await
            {
                Ok(link) => link,
                Err(e) => {
                    warn!(job_id = %job.job_id, error = %e, "link resolution failed");
                    None
                }
            };
            if resolved.is_none() {
                warn!(job_id = %job.job_id, "failed to retrieve job link");
            }

            job.resolved_link = choose_link(resolved, &job.related_links);

            let Some(notification) = Notification::for_job(&job) else {
                warn!(job_id = %job.job_id, "no link available, skipping notification");
                report.skipped += 1;
                continue;
            };

            match self.sink.deliver(&notification).await {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    error!(job_id = %job.job_id, error = %e, "failed to deliver notification");
                    report.failed += 1;
                }
            }
        }

        self.seen.lock().await.clone_from(&seen);

        match self.store.save(&seen).await {
            Ok(()) => report.persisted = true,
            Err(e) => {
                error!(
                    path = %self.store.path().display(),
                    error = %e,
                    "failed to persist dedup state, seen jobs may be notified again after restart"
                );
            }
        }

        report.finished_at = Utc::now();
        CycleOutcome::Completed(report)
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Completed(report) => info!(
            fetched = report.fetched,
            new = report.new,
            notified = report.notified,
            skipped = report.skipped,
            failed = report.failed,
            persisted = report.persisted,
            "cycle complete"
        ),
        CycleOutcome::Failed(e) => warn!(error = %e, "cycle failed"),
        CycleOutcome::Skipped => {}
    }
}
