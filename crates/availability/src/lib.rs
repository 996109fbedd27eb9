//! Cached sailing inventory and delta reconciliation.
//!
//! This crate provides the client's view of sailing inventory:
//! - [`SailingResult`] and friends: the cached search-result data model
//! - [`AvailabilityDelta`]: a relative inventory change (booked/freed counts)
//! - [`SearchCache`]: the working set of results for the current search
//! - [`apply_delta`]: the pure reconciler that folds one delta into the cache
//! - Wire types ([`ServerMessage`], [`ClientFrame`]) with the normalization
//!   boundary that maps both accepted identifier spellings to [`SailingId`]

pub mod cache;
pub mod delta;
pub mod reconciler;
pub mod sailing;
pub mod wire;

pub use cache::SearchCache;
pub use common::SailingId;
pub use delta::{AvailabilityDelta, ChangeType, DeltaSource};
pub use reconciler::{ReconcileOutcome, apply_delta};
pub use sailing::{AvailableSpaces, CabinBucket, PassengerType, PriceTable, SailingResult};
pub use wire::{AvailabilityEvent, ClientFrame, ServerMessage, WireAvailability};
