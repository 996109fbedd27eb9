//! The 1-second driver task around a payment countdown.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::countdown::{CountdownSnapshot, PaymentCountdown, Urgency};

/// Drives a [`PaymentCountdown`] on a fixed 1-second tick.
///
/// Snapshots are published over a watch channel; the expiry callback is
/// invoked exactly once, immediately if the deadline is already in the
/// past when the timer is spawned. Cancelling or dropping the handle
/// clears the interval, so no tick survives the owning view.
pub struct ExpirationTimer {
    snapshots: watch::Receiver<CountdownSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl ExpirationTimer {
    /// Spawns the timer toward the given deadline.
    pub fn spawn(
        expires_at: DateTime<Utc>,
        on_expired: impl FnOnce() + Send + 'static,
    ) -> Self {
        let countdown = PaymentCountdown::new(expires_at);
        let initial = countdown.evaluate(Utc::now());
        let (snapshots_tx, snapshots_rx) = watch::channel(initial.clone());

        // The tick loop measures against the runtime clock so the
        // countdown stays testable under a paused runtime; wall-clock
        // time is only sampled once, here.
        let deadline = Instant::now() + initial.remaining;

        let task = tokio::spawn(run(countdown, deadline, snapshots_tx, on_expired));

        Self {
            snapshots: snapshots_rx,
            task: Some(task),
        }
    }

    /// Returns the most recent countdown snapshot.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns a watch receiver for awaiting countdown updates.
    pub fn watch(&self) -> watch::Receiver<CountdownSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the tick loop.
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ExpirationTimer {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn run(
    mut countdown: PaymentCountdown,
    deadline: Instant,
    snapshots: watch::Sender<CountdownSnapshot>,
    on_expired: impl FnOnce() + Send + 'static,
) {
    let expires_at = countdown.expires_at();
    let mut on_expired = Some(on_expired);
    let mut interval = time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let now = expires_at
            - chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::zero());
        let snapshot = countdown.evaluate(now);
        let expired = snapshot.urgency == Urgency::Expired;
        let _ = snapshots.send(snapshot);

        if countdown.poll_expired(now) {
            metrics::counter!("payment_sessions_expired").increment(1);
            tracing::info!("payment session expired");
            if let Some(callback) = on_expired.take() {
                callback();
            }
        }

        if expired {
            // Terminal state; the interval stops with the task.
            return;
        }
    }
}
