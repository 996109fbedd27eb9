//! Booking error types.

use common::{PassengerId, VehicleId};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// No passenger with the given ID in the cart.
    #[error("Passenger not found: {0}")]
    PassengerNotFound(PassengerId),

    /// No vehicle with the given ID in the cart.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),
}
