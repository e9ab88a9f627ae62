//! Midnight refresh: derived statistics are recomputed when the calendar day
//! rolls over, then the next refresh is armed.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;

use study_core::Clock;
use study_core::time::next_midnight;

pub type RefreshCallback = Box<dyn FnOnce() + Send + 'static>;

/// Runs a callback once at (or after) a point in time.
pub trait RefreshScheduler: Send + Sync {
    fn schedule_at(&self, at: DateTime<Utc>, callback: RefreshCallback);
}

/// Sleeps on the tokio runtime. `schedule_at` must be called from within a
/// runtime.
#[derive(Debug, Clone, Copy)]
pub struct TokioRefreshScheduler {
    clock: Clock,
}

impl TokioRefreshScheduler {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }
}

impl RefreshScheduler for TokioRefreshScheduler {
    fn schedule_at(&self, at: DateTime<Utc>, callback: RefreshCallback) {
        let delay = (at - self.clock.now()).to_std().unwrap_or_default();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
    }
}

/// Holds callbacks until the caller fires them; lets tests drive day changes
/// without waiting.
#[derive(Default)]
pub struct ManualRefreshScheduler {
    pending: Mutex<Vec<(DateTime<Utc>, RefreshCallback)>>,
}

impl ManualRefreshScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times of the callbacks not yet fired, in scheduling order.
    #[must_use]
    pub fn pending(&self) -> Vec<DateTime<Utc>> {
        self.pending
            .lock()
            .map(|guard| guard.iter().map(|(at, _)| *at).collect())
            .unwrap_or_default()
    }

    /// Run every callback due at `now`. Callbacks scheduled while firing wait
    /// for the next call.
    pub fn fire_due(&self, now: DateTime<Utc>) -> usize {
        let due = match self.pending.lock() {
            Ok(mut guard) => {
                let (due, later): (Vec<_>, Vec<_>) =
                    guard.drain(..).partition(|(at, _)| *at <= now);
                *guard = later;
                due
            }
            Err(_) => return 0,
        };
        let fired = due.len();
        for (_, callback) in due {
            callback();
        }
        fired
    }
}

impl RefreshScheduler for ManualRefreshScheduler {
    fn schedule_at(&self, at: DateTime<Utc>, callback: RefreshCallback) {
        if let Ok(mut guard) = self.pending.lock() {
            guard.push((at, callback));
        }
    }
}

/// Invokes `on_refresh` at every UTC midnight, re-arming itself each time.
pub struct DailyRefresh {
    clock: Clock,
    scheduler: Arc<dyn RefreshScheduler>,
    on_refresh: Arc<dyn Fn(DateTime<Utc>) + Send + Sync>,
}

impl DailyRefresh {
    #[must_use]
    pub fn new(
        clock: Clock,
        scheduler: Arc<dyn RefreshScheduler>,
        on_refresh: impl Fn(DateTime<Utc>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            clock,
            scheduler,
            on_refresh: Arc::new(on_refresh),
        })
    }

    /// Arm the next refresh; returns when it is due.
    pub fn start(self: &Arc<Self>) -> DateTime<Utc> {
        self.arm(self.clock.now())
    }

    // A clock reading behind the midnight that just fired still re-arms for
    // the following one.
    fn arm(self: &Arc<Self>, after: DateTime<Utc>) -> DateTime<Utc> {
        let at = next_midnight(after);
        let this = Arc::clone(self);
        self.scheduler.schedule_at(
            at,
            Box::new(move || {
                debug!(%at, "day rolled over");
                (this.on_refresh)(at);
                this.arm(this.clock.now().max(at));
            }),
        );
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use study_core::time::{fixed_clock, fixed_now};

    #[test]
    fn arms_for_next_midnight_and_rearms_after_firing() {
        let scheduler = Arc::new(ManualRefreshScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let refresh = DailyRefresh::new(fixed_clock(), scheduler.clone(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let at = refresh.start();
        assert_eq!(at, next_midnight(fixed_now()));
        assert_eq!(scheduler.pending(), vec![at]);

        assert_eq!(scheduler.fire_due(fixed_now()), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(scheduler.fire_due(at), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        let rearmed = scheduler.pending();
        assert_eq!(rearmed, vec![at + chrono::Duration::days(1)]);
        assert!(rearmed[0] > at);

        // The clock stays behind the first midnight; firing again must not
        // repeat it.
        assert_eq!(scheduler.fire_due(at), 0);
        assert_eq!(scheduler.fire_due(rearmed[0]), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending(), vec![at + chrono::Duration::days(2)]);
    }

    #[test]
    fn fires_only_due_callbacks() {
        let scheduler = ManualRefreshScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        for hours in [1, 2, 48] {
            let counter = Arc::clone(&fired);
            scheduler.schedule_at(
                fixed_now() + chrono::Duration::hours(hours),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        assert_eq!(scheduler.fire_due(fixed_now() + chrono::Duration::hours(2)), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending().len(), 1);
    }

    #[tokio::test]
    async fn tokio_scheduler_runs_past_due_callbacks_immediately() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let scheduler = TokioRefreshScheduler::new(fixed_clock());
        scheduler.schedule_at(
            fixed_now() - chrono::Duration::seconds(5),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        rx.await.unwrap();
    }
}
