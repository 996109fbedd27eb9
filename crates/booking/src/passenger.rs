//! Passenger entries in the cart.

use availability::PassengerType;
use chrono::NaiveDate;
use common::PassengerId;
use serde::{Deserialize, Serialize};

/// A pet travelling with a passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDetails {
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cage_required: Option<bool>,
}

/// One traveler on the reservation.
///
/// Entries are keyed by [`PassengerId`] and upserted through the cart's
/// passenger commands; the edit forms live outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: PassengerId,
    pub passenger_type: PassengerType,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetDetails>,
}

impl Passenger {
    /// Creates a passenger with a fresh ID and only the required fields.
    pub fn new(
        passenger_type: PassengerType,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: PassengerId::new(),
            passenger_type,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            nationality: None,
            passport_number: None,
            special_needs: None,
            pet: None,
        }
    }

    /// Returns true when both name parts are filled in.
    pub fn has_complete_name(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

/// Partial update for a passenger; fields present replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_type: Option<PassengerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetDetails>,
}

impl PassengerUpdate {
    /// Applies this patch to a passenger.
    pub fn apply_to(self, passenger: &mut Passenger) {
        if let Some(passenger_type) = self.passenger_type {
            passenger.passenger_type = passenger_type;
        }
        if let Some(first_name) = self.first_name {
            passenger.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            passenger.last_name = last_name;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            passenger.date_of_birth = Some(date_of_birth);
        }
        if let Some(nationality) = self.nationality {
            passenger.nationality = Some(nationality);
        }
        if let Some(passport_number) = self.passport_number {
            passenger.passport_number = Some(passport_number);
        }
        if let Some(special_needs) = self.special_needs {
            passenger.special_needs = Some(special_needs);
        }
        if let Some(pet) = self.pet {
            passenger.pet = Some(pet);
        }
    }
}
