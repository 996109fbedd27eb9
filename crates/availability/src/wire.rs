//! Push-channel wire shapes and the ingestion normalization boundary.
//!
//! Everything in this module mirrors the server contract byte for byte.
//! [`AvailabilityEvent::into_canonical`] is the single place where the two
//! accepted identifier spellings and the event-level `source` field are
//! folded into the canonical [`AvailabilityDelta`]; code past this boundary
//! never sees wire naming.

use chrono::{DateTime, Utc};
use common::{BookingReference, RouteCode, SailingId};
use serde::{Deserialize, Serialize};

use crate::delta::{AvailabilityDelta, ChangeType, DeltaSource};

/// Server→client messages on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection acknowledged.
    Connected,
    /// Subscription acknowledged for the listed routes.
    Subscribed { routes: Vec<RouteCode> },
    /// One inventory change for one sailing.
    AvailabilityUpdate { data: AvailabilityEvent },
    /// Keepalive reply.
    Pong,
    /// Server-side error; informational, the stream continues.
    Error { message: String },
}

/// Client→server control frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { routes: Vec<RouteCode> },
    Unsubscribe { routes: Vec<RouteCode> },
    Ping,
}

/// The payload of an `availability_update` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEvent {
    #[serde(rename = "ferryId", alias = "sailingId")]
    pub sailing_id: SailingId,
    pub route: RouteCode,
    pub departure_time: DateTime<Utc>,
    pub availability: WireAvailability,
    pub source: DeltaSource,
    pub updated_at: DateTime<Utc>,
}

/// The change quantities as they appear on the wire.
///
/// `source` lives on the enclosing event, and an internal booking may carry
/// the reference that caused it; both are folded into the canonical delta
/// by [`AvailabilityEvent::into_canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAvailability {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<BookingReference>,
}

impl AvailabilityEvent {
    /// Normalizes this wire event into the canonical sailing id and delta.
    pub fn into_canonical(self) -> (SailingId, AvailabilityDelta) {
        let wire = self.availability;
        let delta = AvailabilityDelta {
            change_type: wire.change_type,
            passengers_booked: wire.passengers_booked,
            passengers_freed: wire.passengers_freed,
            vehicles_booked: wire.vehicles_booked,
            vehicles_freed: wire.vehicles_freed,
            cabin_quantity: wire.cabin_quantity,
            cabins_freed: wire.cabins_freed,
            source: self.source,
        };
        (self.sailing_id, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_availability_update_with_ferry_id() {
        let json = r#"{
            "type": "availability_update",
            "data": {
                "ferryId": "VIK-1",
                "route": "HEL-TAL",
                "departureTime": "2026-06-01T08:00:00Z",
                "availability": {
                    "changeType": "booking_created",
                    "passengersBooked": 2,
                    "cabinQuantity": 1,
                    "bookingReference": "BK-0007"
                },
                "source": "internal",
                "updatedAt": "2026-06-01T07:15:00Z"
            }
        }"#;

        let message: ServerMessage = serde_json::from_str(json).unwrap();
        let ServerMessage::AvailabilityUpdate { data } = message else {
            panic!("expected availability_update");
        };
        let (sailing_id, delta) = data.into_canonical();

        assert_eq!(sailing_id.as_str(), "VIK-1");
        assert_eq!(delta.change_type, ChangeType::BookingCreated);
        assert_eq!(delta.passengers_booked, Some(2));
        assert_eq!(delta.cabin_quantity, Some(1));
        assert_eq!(delta.source, DeltaSource::Internal);
    }

    #[test]
    fn test_parse_availability_update_with_sailing_id_spelling() {
        let json = r#"{
            "type": "availability_update",
            "data": {
                "sailingId": "VIK-9",
                "route": "HEL-TAL",
                "departureTime": "2026-06-01T08:00:00Z",
                "availability": {"changeType": "booking_cancelled", "cabinsFreed": 2},
                "source": "external",
                "updatedAt": "2026-06-01T07:15:00Z"
            }
        }"#;

        let message: ServerMessage = serde_json::from_str(json).unwrap();
        let ServerMessage::AvailabilityUpdate { data } = message else {
            panic!("expected availability_update");
        };
        let (sailing_id, delta) = data.into_canonical();

        assert_eq!(sailing_id.as_str(), "VIK-9");
        assert_eq!(delta.cabins_freed, Some(2));
        assert_eq!(delta.source, DeltaSource::External);
    }

    #[test]
    fn test_parse_lifecycle_messages() {
        let connected: ServerMessage = serde_json::from_str(r#"{"type": "connected"}"#).unwrap();
        assert_eq!(connected, ServerMessage::Connected);

        let subscribed: ServerMessage =
            serde_json::from_str(r#"{"type": "subscribed", "routes": ["HEL-TAL"]}"#).unwrap();
        assert_eq!(
            subscribed,
            ServerMessage::Subscribed {
                routes: vec!["HEL-TAL".into()]
            }
        );

        let pong: ServerMessage = serde_json::from_str(r#"{"type": "pong"}"#).unwrap();
        assert_eq!(pong, ServerMessage::Pong);

        let error: ServerMessage =
            serde_json::from_str(r#"{"type": "error", "message": "route unknown"}"#).unwrap();
        assert_eq!(
            error,
            ServerMessage::Error {
                message: "route unknown".to_string()
            }
        );
    }

    #[test]
    fn test_client_frame_wire_shape() {
        let subscribe = ClientFrame::Subscribe {
            routes: vec!["HEL-TAL".into(), "STO-TKU".into()],
        };
        let json = serde_json::to_value(&subscribe).unwrap();
        assert_eq!(json["action"], "subscribe");
        assert_eq!(json["routes"][1], "STO-TKU");

        let ping = serde_json::to_value(ClientFrame::Ping).unwrap();
        assert_eq!(ping["action"], "ping");
    }
}
