//! Pure reconciliation of availability deltas into cached results.

use common::SailingId;

use crate::delta::AvailabilityDelta;
use crate::sailing::{CabinBucket, SailingResult};

/// Result of applying one delta to a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The sailing was found and the delta was folded in.
    Applied,
    /// No cached sailing matched the identifier; the set is unchanged.
    Unmatched,
}

/// Applies one relative inventory delta to the sailing it targets.
///
/// All counters saturate at zero on subtraction. Freed quantities are added
/// without an upper bound: deltas are relative and the server never tells us
/// the capacity ceiling. Replaying the same delta applies it again; callers
/// that can receive redeliveries get double-counting, which is the accepted
/// contract of this feed.
pub fn apply_delta(
    results: &mut [SailingResult],
    sailing_id: &SailingId,
    delta: &AvailabilityDelta,
) -> ReconcileOutcome {
    let Some(sailing) = results.iter_mut().find(|s| s.id == *sailing_id) else {
        tracing::debug!(sailing_id = %sailing_id, "delta for unknown sailing, ignoring");
        metrics::counter!("availability_deltas_unmatched").increment(1);
        return ReconcileOutcome::Unmatched;
    };

    let spaces = &mut sailing.available_spaces;

    if let Some(count) = delta.passengers_booked {
        spaces.passengers = spaces.passengers.saturating_sub(count);
    }
    if let Some(count) = delta.passengers_freed {
        spaces.passengers += count;
    }
    if let Some(count) = delta.vehicles_booked {
        spaces.vehicles = spaces.vehicles.saturating_sub(count);
    }
    if let Some(count) = delta.vehicles_freed {
        spaces.vehicles += count;
    }

    if let Some(quantity) = delta.cabin_quantity {
        spaces.cabins = spaces.cabins.saturating_sub(quantity);
        deplete_quota_buckets(&mut sailing.cabin_types, quantity);
    }
    if let Some(quantity) = delta.cabins_freed {
        spaces.cabins += quantity;
        credit_first_quota_bucket(&mut sailing.cabin_types, quantity);
    }

    metrics::counter!("availability_deltas_applied").increment(1);
    ReconcileOutcome::Applied
}

/// Subtracts `quantity` cabins across quota buckets in list order.
///
/// Each bucket gives up at most what it currently holds; seating buckets
/// are skipped.
fn deplete_quota_buckets(buckets: &mut [CabinBucket], quantity: u32) {
    let mut remaining = quantity;
    for bucket in buckets.iter_mut() {
        if remaining == 0 {
            break;
        }
        if !bucket.is_quota() {
            continue;
        }
        let take = bucket.available.min(remaining);
        bucket.available -= take;
        remaining -= take;
    }
}

/// Credits the whole freed quantity to the first quota bucket.
///
/// The delta payload does not say which bucket the cancelled cabins came
/// from, so the credit lands in the first quota bucket encountered.
fn credit_first_quota_bucket(buckets: &mut [CabinBucket], quantity: u32) {
    if let Some(bucket) = buckets.iter_mut().find(|b| b.is_quota()) {
        bucket.available += quantity;
    }
}
