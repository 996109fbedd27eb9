//! Session-scoped local artifacts.
//!
//! The cart itself is never persisted across a full reload; the only
//! things allowed in local storage are narrow session artifacts like the
//! pending booking-reference marker. Older client versions did persist
//! cart fragments, so boot must purge whatever legacy blob it finds.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use common::BookingReference;
use serde::{Deserialize, Serialize};

/// The pending booking marker cached between screens of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBookingMarker {
    pub reference: BookingReference,
    pub expires_at: DateTime<Utc>,
}

/// Narrowly-scoped session storage.
///
/// Implementations must treat the pending booking marker as superseded
/// state: storing a new one replaces the old, and clearing is explicit.
pub trait SessionArtifacts: Send + Sync {
    /// Returns the cached pending booking marker, if any.
    fn pending_booking(&self) -> Option<StoredBookingMarker>;

    /// Caches a pending booking marker, replacing any previous one.
    fn store_pending_booking(&self, marker: StoredBookingMarker);

    /// Removes the cached pending booking marker.
    fn clear_pending_booking(&self);

    /// Removes any legacy persisted cart fragment.
    ///
    /// Returns true if a fragment was found and purged.
    fn purge_legacy_cart(&self) -> bool;
}

#[derive(Debug, Default)]
struct StoreState {
    pending_booking: Option<StoredBookingMarker>,
    legacy_cart_blob: Option<String>,
}

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants a legacy cart fragment, as an old client version would have
    /// left behind.
    pub fn seed_legacy_cart(&self, blob: impl Into<String>) {
        self.state.lock().unwrap().legacy_cart_blob = Some(blob.into());
    }

    /// Returns true while a legacy cart fragment is present.
    pub fn has_legacy_cart(&self) -> bool {
        self.state.lock().unwrap().legacy_cart_blob.is_some()
    }
}

impl SessionArtifacts for InMemorySessionStore {
    fn pending_booking(&self) -> Option<StoredBookingMarker> {
        self.state.lock().unwrap().pending_booking.clone()
    }

    fn store_pending_booking(&self, marker: StoredBookingMarker) {
        self.state.lock().unwrap().pending_booking = Some(marker);
    }

    fn clear_pending_booking(&self) {
        self.state.lock().unwrap().pending_booking = None;
    }

    fn purge_legacy_cart(&self) -> bool {
        let purged = self.state.lock().unwrap().legacy_cart_blob.take().is_some();
        if purged {
            tracing::info!("purged legacy persisted cart fragment");
        }
        purged
    }
}
