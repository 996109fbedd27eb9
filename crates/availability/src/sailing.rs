//! Sailing search-result data model.

use chrono::{DateTime, Utc};
use common::{Money, RouteCode, SailingId};
use serde::{Deserialize, Serialize};

/// Cabin type codes that are seating rather than bookable cabin inventory.
///
/// These buckets are never depleted or credited by cabin bookings.
const NON_QUOTA_CABIN_TYPES: &[&str] = &["deck", "seat", "reclining_seat"];

/// Passenger fare classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

impl PassengerType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Adult => "adult",
            PassengerType::Child => "child",
            PassengerType::Infant => "infant",
        }
    }
}

impl std::fmt::Display for PassengerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-sailing tariff: one price per passenger type plus the vehicle price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    pub adult: Money,
    pub child: Money,
    pub infant: Money,
    pub vehicle: Money,
}

impl PriceTable {
    /// Returns the fare for the given passenger type.
    pub fn fare_for(&self, passenger_type: PassengerType) -> Money {
        match passenger_type {
            PassengerType::Adult => self.adult,
            PassengerType::Child => self.child,
            PassengerType::Infant => self.infant,
        }
    }
}

/// Remaining capacity counters for one sailing.
///
/// Every mutation goes through the reconciler, which saturates at zero;
/// these fields are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSpaces {
    pub passengers: u32,
    pub vehicles: u32,
    pub cabins: u32,
}

/// One cabin-type bucket: a category code, its remaining count, and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinBucket {
    /// Category code, e.g. `"inside_twin"`, `"suite"`, `"deck"`.
    #[serde(rename = "type")]
    pub code: String,
    pub available: u32,
    pub price: Money,
}

impl CabinBucket {
    /// Creates a new cabin bucket.
    pub fn new(code: impl Into<String>, available: u32, price: Money) -> Self {
        Self {
            code: code.into(),
            available,
            price,
        }
    }

    /// Returns true if this bucket holds limited cabin inventory.
    ///
    /// Deck space and seating are unlimited from the cabin-quota
    /// perspective and are skipped when depleting or crediting.
    pub fn is_quota(&self) -> bool {
        !NON_QUOTA_CABIN_TYPES.contains(&self.code.as_str())
    }
}

/// One scheduled sailing as returned by the search collaborator.
///
/// Instances live in the [`crate::SearchCache`] and are mutated in place by
/// the reconciler until the next search replaces them. The identifier is
/// accepted under either wire spelling (`ferryId` or `sailingId`) and is
/// canonical from here on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SailingResult {
    #[serde(rename = "ferryId", alias = "sailingId")]
    pub id: SailingId,
    pub route: RouteCode,
    pub operator: String,
    pub departure_port: String,
    pub arrival_port: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub prices: PriceTable,
    pub available_spaces: AvailableSpaces,
    /// Cabin buckets in the order delivered by the operator; depletion
    /// walks this order.
    pub cabin_types: Vec<CabinBucket>,
}

impl SailingResult {
    /// Returns the cabin bucket with the given code, if present.
    pub fn cabin_bucket(&self, code: &str) -> Option<&CabinBucket> {
        self.cabin_types.iter().find(|bucket| bucket.code == code)
    }
}
