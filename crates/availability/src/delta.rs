//! Relative inventory changes pushed over the live channel.

use serde::{Deserialize, Serialize};

/// The kind of inventory change a delta describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Another traveler completed a booking; counts go down.
    BookingCreated,
    /// A booking was cancelled; counts go up.
    BookingCancelled,
    /// Upstream resynchronization; carries whatever fields it carries.
    Sync,
}

/// Where the change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSource {
    /// A booking made through this platform.
    Internal,
    /// The operator's upstream inventory feed.
    External,
}

/// A relative inventory change for one sailing.
///
/// Deltas carry booked/freed quantities, never absolute totals, so
/// out-of-order application still converges. Replaying the same delta
/// applies it again; there is no idempotency key in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDelta {
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers_booked: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers_freed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicles_booked: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicles_freed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabins_freed: Option<u32>,
    pub source: DeltaSource,
}

impl AvailabilityDelta {
    /// Creates an empty delta of the given kind and source.
    pub fn new(change_type: ChangeType, source: DeltaSource) -> Self {
        Self {
            change_type,
            passengers_booked: None,
            passengers_freed: None,
            vehicles_booked: None,
            vehicles_freed: None,
            cabin_quantity: None,
            cabins_freed: None,
            source,
        }
    }

    /// Sets the number of passenger places taken.
    pub fn with_passengers_booked(mut self, count: u32) -> Self {
        self.passengers_booked = Some(count);
        self
    }

    /// Sets the number of passenger places released.
    pub fn with_passengers_freed(mut self, count: u32) -> Self {
        self.passengers_freed = Some(count);
        self
    }

    /// Sets the number of vehicle places taken.
    pub fn with_vehicles_booked(mut self, count: u32) -> Self {
        self.vehicles_booked = Some(count);
        self
    }

    /// Sets the number of vehicle places released.
    pub fn with_vehicles_freed(mut self, count: u32) -> Self {
        self.vehicles_freed = Some(count);
        self
    }

    /// Sets the number of cabins taken.
    pub fn with_cabin_quantity(mut self, count: u32) -> Self {
        self.cabin_quantity = Some(count);
        self
    }

    /// Sets the number of cabins released.
    pub fn with_cabins_freed(mut self, count: u32) -> Self {
        self.cabins_freed = Some(count);
        self
    }
}
