//! Booking/payment collaborator trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use booking::BookingCart;
use chrono::{DateTime, Duration, Utc};
use common::{BookingReference, Money};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Lifecycle status of a server-side booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Created, awaiting payment within the session window.
    Pending,
    Confirmed,
    Completed,
    Failed,
}

impl BookingStatus {
    /// Returns true when the booking needs no further payment step.
    pub fn is_settled(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

/// A booking as returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub reference: BookingReference,
    /// Authoritative total; supersedes the cart's provisional sum.
    pub total_amount: Money,
    /// When the payment session lapses.
    pub expires_at: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Trait for booking creation and payment confirmation.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Creates a booking for the cart's current selections.
    async fn create_booking(&self, cart: &BookingCart) -> Result<BookingRecord, ClientError>;

    /// Confirms payment for a previously created booking.
    async fn confirm_payment(
        &self,
        reference: &BookingReference,
    ) -> Result<BookingRecord, ClientError>;
}

/// Cancellation-protection fee the stub prices in, in cents.
const PROTECTION_FEE_CENTS: i64 = 950;

#[derive(Debug)]
struct InMemoryGatewayState {
    bookings: Vec<BookingRecord>,
    next_id: u32,
    session_ttl: Duration,
    status_on_create: BookingStatus,
    fail_on_create: bool,
    fail_on_confirm: bool,
}

impl Default for InMemoryGatewayState {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            next_id: 0,
            session_ttl: Duration::minutes(20),
            status_on_create: BookingStatus::Pending,
            fail_on_create: false,
            fail_on_confirm: false,
        }
    }
}

/// In-memory booking gateway for testing.
///
/// Issues sequential references (`BK-0001`, ...) and prices the
/// authoritative total as the cart's provisional sum plus the protection
/// fee when selected, deliberately different from the client's own sum
/// so tests can observe the supersede.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryBookingGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long payment sessions last.
    pub fn set_session_ttl(&self, ttl: Duration) {
        self.state.write().unwrap().session_ttl = ttl;
    }

    /// Sets the status newly created bookings come back with.
    pub fn set_status_on_create(&self, status: BookingStatus) {
        self.state.write().unwrap().status_on_create = status;
    }

    /// Configures the gateway to fail booking creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the gateway to fail payment confirmation.
    pub fn set_fail_on_confirm(&self, fail: bool) {
        self.state.write().unwrap().fail_on_confirm = fail;
    }

    /// Returns the number of bookings created.
    pub fn booking_count(&self) -> usize {
        self.state.read().unwrap().bookings.len()
    }
}

#[async_trait]
impl BookingGateway for InMemoryBookingGateway {
    async fn create_booking(&self, cart: &BookingCart) -> Result<BookingRecord, ClientError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(ClientError::Booking("booking rejected".to_string()));
        }

        let mut total = cart.provisional_total();
        if cart.cancellation_protection() {
            total += Money::from_cents(PROTECTION_FEE_CENTS);
        }

        state.next_id += 1;
        let record = BookingRecord {
            reference: BookingReference::new(format!("BK-{:04}", state.next_id)),
            total_amount: total,
            expires_at: Utc::now() + state.session_ttl,
            status: state.status_on_create,
        };
        state.bookings.push(record.clone());

        Ok(record)
    }

    async fn confirm_payment(
        &self,
        reference: &BookingReference,
    ) -> Result<BookingRecord, ClientError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_confirm {
            return Err(ClientError::Booking("payment declined".to_string()));
        }

        let record = state
            .bookings
            .iter_mut()
            .find(|b| b.reference == *reference)
            .ok_or_else(|| ClientError::Booking(format!("unknown booking {reference}")))?;
        record.status = BookingStatus::Completed;

        Ok(record.clone())
    }
}
