//! Root controller and collaborator services for the ferry-booking client.
//!
//! This crate wires the core together:
//! - [`services`]: the collaborator traits (search, promo validation,
//!   booking/payment) with in-memory implementations
//! - [`BookingController`]: the single owner of cart, cache, step, and
//!   countdown; every mutation funnels through it
//! - [`ClientConfig`]: environment configuration for the shell binary

pub mod config;
pub mod controller;
pub mod error;
pub mod services;

pub use config::ClientConfig;
pub use controller::BookingController;
pub use error::ClientError;
pub use services::booking::{
    BookingGateway, BookingRecord, BookingStatus, InMemoryBookingGateway,
};
pub use services::promo::{InMemoryPromoApi, PromoRequest, PromoValidation, PromoValidator};
pub use services::search::{InMemorySearchApi, SearchApi};
