// ── Periodic scheduling seam ──
//
// The coordinator never owns a timer. It hands a job to whatever
// `Scheduler` the host provides; `TokioScheduler` is the default.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A repeatable unit of scheduled work.
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs jobs on a fixed period on behalf of the coordinator.
///
/// Implementations must not overlap runs of the same job: the next run
/// starts only after the previous one has finished.
pub trait Scheduler: Send + Sync {
    /// Run `job` every `period`, first one period from now.
    fn every(&self, period: Duration, job: Job) -> ScheduledTask;
}

/// Handle to a registered job. Cancelling stops future runs.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    cancel: CancellationToken,
}

impl ScheduledTask {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Scheduler backed by `tokio::time::interval` on the current runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    cancel: CancellationToken,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop every job registered through this scheduler.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, job: Job) -> ScheduledTask {
        let token = self.cancel.child_token();
        tokio::spawn(run_every(period, job, token.clone()));
        ScheduledTask::new(token)
    }
}

async fn run_every(period: Duration, job: Job, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => job().await,
        }
    }
    debug!(?period, "scheduled job stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_job() -> (Job, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let job: Job = Arc::new(move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        });
        (job, count)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_every_period_after_the_first() {
        let scheduler = TokioScheduler::new();
        let (job, count) = counting_job();
        let task = scheduler.every(Duration::from_secs(60), job);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(160)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        task.cancel();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_children() {
        let scheduler = TokioScheduler::new();
        let (job, count) = counting_job();
        let task = scheduler.every(Duration::from_secs(1), job);
        scheduler.shutdown();
        assert!(task.is_cancelled());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
