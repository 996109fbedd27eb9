//! Vehicle entries in the cart.

use common::VehicleId;
use serde::{Deserialize, Serialize};

/// One vehicle on the reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    /// Category as quoted by the operator, e.g. `"car"`, `"van"`,
    /// `"motorcycle"`.
    pub vehicle_type: String,
    pub length_cm: u32,
    pub width_cm: u32,
    pub height_cm: u32,
    pub registration: String,
    pub has_trailer: bool,
    pub has_roof_load: bool,
}

impl Vehicle {
    /// Creates a vehicle with a fresh ID.
    pub fn new(
        vehicle_type: impl Into<String>,
        length_cm: u32,
        width_cm: u32,
        height_cm: u32,
        registration: impl Into<String>,
    ) -> Self {
        Self {
            id: VehicleId::new(),
            vehicle_type: vehicle_type.into(),
            length_cm,
            width_cm,
            height_cm,
            registration: registration.into(),
            has_trailer: false,
            has_roof_load: false,
        }
    }
}

/// Partial update for a vehicle; fields present replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_cm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_cm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_trailer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_roof_load: Option<bool>,
}

impl VehicleUpdate {
    /// Applies this patch to a vehicle.
    pub fn apply_to(self, vehicle: &mut Vehicle) {
        if let Some(vehicle_type) = self.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(length_cm) = self.length_cm {
            vehicle.length_cm = length_cm;
        }
        if let Some(width_cm) = self.width_cm {
            vehicle.width_cm = width_cm;
        }
        if let Some(height_cm) = self.height_cm {
            vehicle.height_cm = height_cm;
        }
        if let Some(registration) = self.registration {
            vehicle.registration = registration;
        }
        if let Some(has_trailer) = self.has_trailer {
            vehicle.has_trailer = has_trailer;
        }
        if let Some(has_roof_load) = self.has_roof_load {
            vehicle.has_roof_load = has_roof_load;
        }
    }
}
