//! Client error types.

use booking::{BookingError, ValidationReport};
use common::SailingId;
use thiserror::Error;

/// Errors surfaced by the booking controller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The search collaborator failed.
    #[error("Search failed: {0}")]
    Search(String),

    /// The promo-validation collaborator failed.
    #[error("Promo validation failed: {0}")]
    Promo(String),

    /// The booking collaborator failed; the cart is intact and the call
    /// can be retried.
    #[error("Booking service failed: {0}")]
    Booking(String),

    /// A cart command failed.
    #[error(transparent)]
    Cart(#[from] BookingError),

    /// The cart failed the payment-boundary checks.
    #[error("Booking details are incomplete")]
    Validation(ValidationReport),

    /// The referenced sailing is not in the current search results.
    #[error("Sailing not in current results: {0}")]
    UnknownSailing(SailingId),

    /// An operation required a sailing selection that is missing.
    #[error("No sailing selected")]
    NoSailingSelected,

    /// An operation required an in-flight booking that is missing.
    #[error("No pending booking")]
    NoPendingBooking,
}
