//! Shared types for the ferry-booking client.
//!
//! This crate provides the identifiers and the money value object used
//! across the availability, booking, session, and client layers.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{BookingReference, PassengerId, RouteCode, SailingId, VehicleId};
