//! Booking cart and checkout flow for the ferry client.
//!
//! This crate holds everything the traveler assembles before paying:
//! - [`BookingCart`]: the single working copy of all selections, mutated
//!   only through its named command set
//! - [`CheckoutStep`]: the five-stage flow with guarded navigation
//! - Value objects: passengers, vehicles, cabin and meal selections,
//!   contact info, applied promo
//! - [`validate_for_payment`]: the boundary check that gates the payment
//!   step

pub mod cart;
pub mod contact;
pub mod error;
pub mod passenger;
pub mod selection;
pub mod state;
pub mod validation;
pub mod vehicle;

pub use cart::{AppliedPromo, BookingCart, PendingBooking, SearchParams};
pub use contact::ContactInfo;
pub use error::BookingError;
pub use passenger::{Passenger, PassengerUpdate, PetDetails};
pub use selection::{CabinSelection, Leg, MealSelection};
pub use state::CheckoutStep;
pub use validation::{FieldIssue, Section, ValidationReport, validate_for_payment};
pub use vehicle::{Vehicle, VehicleUpdate};
