//! Pure countdown evaluation.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// How urgently the remaining payment time should be presented.
///
/// Classified by whole remaining minutes: more than 15 is normal, 5
/// through 15 is a warning, under 5 (but not yet zero) is critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
    Expired,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Normal => write!(f, "normal"),
            Urgency::Warning => write!(f, "warning"),
            Urgency::Critical => write!(f, "critical"),
            Urgency::Expired => write!(f, "expired"),
        }
    }
}

/// One evaluation of the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub remaining: Duration,
    pub urgency: Urgency,
    pub display: String,
}

/// Countdown to a payment-session deadline.
///
/// The expiry latch guarantees [`PaymentCountdown::poll_expired`] reports
/// the transition to zero exactly once per instantiation, no matter how
/// often the remaining time is recomputed afterwards.
#[derive(Debug, Clone)]
pub struct PaymentCountdown {
    expires_at: DateTime<Utc>,
    expiry_notified: bool,
}

impl PaymentCountdown {
    /// Creates a countdown toward the given deadline.
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            expiry_notified: false,
        }
    }

    /// Returns the deadline.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Recomputes the remaining time at `now`.
    pub fn evaluate(&self, now: DateTime<Utc>) -> CountdownSnapshot {
        let remaining = (self.expires_at - now).to_std().unwrap_or(Duration::ZERO);
        CountdownSnapshot {
            remaining,
            urgency: classify(remaining),
            display: format_remaining(remaining),
        }
    }

    /// Returns true exactly once, at the first evaluation at or past the
    /// deadline.
    pub fn poll_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.expiry_notified || now < self.expires_at {
            return false;
        }
        self.expiry_notified = true;
        true
    }
}

fn classify(remaining: Duration) -> Urgency {
    if remaining.is_zero() {
        return Urgency::Expired;
    }
    let whole_minutes = remaining.as_secs() / 60;
    if whole_minutes > 15 {
        Urgency::Normal
    } else if whole_minutes >= 5 {
        Urgency::Warning
    } else {
        Urgency::Critical
    }
}

/// Formats the remaining time, omitting leading zero units.
///
/// `"1h 5m 3s"`, `"5m 3s"`, `"45s"`; `"0s"` at and after expiry.
fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
