//! Payment-session countdown and session-scoped artifacts.
//!
//! - [`PaymentCountdown`]: pure remaining-time evaluation with urgency
//!   tiers and an exactly-once expiry latch
//! - [`ExpirationTimer`]: the 1-second driver task around a countdown
//! - [`SessionArtifacts`]: narrowly-scoped local session storage (pending
//!   booking marker, legacy cart purge)

pub mod countdown;
pub mod store;
pub mod timer;

pub use countdown::{CountdownSnapshot, PaymentCountdown, Urgency};
pub use store::{InMemorySessionStore, SessionArtifacts, StoredBookingMarker};
pub use timer::ExpirationTimer;
