//! The booking cart: one working copy of everything the traveler selected.

use availability::SailingResult;
use chrono::{DateTime, NaiveDate, Utc};
use common::{BookingReference, Money, PassengerId, RouteCode, VehicleId};
use serde::{Deserialize, Serialize};

use crate::contact::ContactInfo;
use crate::error::BookingError;
use crate::passenger::{Passenger, PassengerUpdate};
use crate::selection::{CabinSelection, Leg, MealSelection};
use crate::vehicle::{Vehicle, VehicleUpdate};

/// Search criteria for a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub route: RouteCode,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub vehicles: u32,
}

impl SearchParams {
    /// Returns true when the trip has a return leg.
    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }
}

/// A validated promo code and the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromo {
    pub code: String,
    pub discount: Money,
    pub message: String,
}

/// The in-flight booking created server-side, awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBooking {
    pub reference: BookingReference,
    /// When the payment session lapses; drives the countdown.
    pub expires_at: DateTime<Utc>,
    /// The authoritative total, superseding the cart's provisional sum.
    pub total: Money,
}

/// All user selections for the in-progress reservation.
///
/// The cart is owned by the root controller and mutated only through the
/// commands below; screens get read access. Selected sailings are
/// snapshots of cached records; totals are priced from each leg's own
/// tariff. Any command that changes a priced selection detaches the
/// pending booking so payment can never run against stale selections.
#[derive(Debug, Clone, Default)]
pub struct BookingCart {
    search_params: Option<SearchParams>,
    outbound: Option<SailingResult>,
    return_sailing: Option<SailingResult>,
    round_trip: bool,
    cabin_selections: Vec<CabinSelection>,
    meals: Vec<MealSelection>,
    promo: Option<AppliedPromo>,
    contact: Option<ContactInfo>,
    passengers: Vec<Passenger>,
    vehicles: Vec<Vehicle>,
    cancellation_protection: bool,
    pending_booking: Option<PendingBooking>,
}

impl BookingCart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }
}

// Commands
impl BookingCart {
    /// Stores the search criteria and derives the round-trip flag.
    pub fn set_search_params(&mut self, params: SearchParams) {
        self.round_trip = params.is_round_trip();
        self.search_params = Some(params);
        if !self.round_trip {
            self.return_sailing = None;
        }
        self.detach_pending_booking();
    }

    /// Selects the sailing for one leg.
    ///
    /// Selecting an outbound sailing on a one-way trip drops any stale
    /// return selection.
    pub fn select_sailing(&mut self, leg: Leg, sailing: SailingResult) {
        match leg {
            Leg::Outbound => {
                self.outbound = Some(sailing);
                if !self.round_trip {
                    self.return_sailing = None;
                }
            }
            Leg::Return => self.return_sailing = Some(sailing),
        }
        self.detach_pending_booking();
    }

    /// Replaces the cabin selections for one leg, keeping the other leg's.
    pub fn set_cabin_selections(&mut self, leg: Leg, selections: Vec<CabinSelection>) {
        self.cabin_selections.retain(|s| s.leg != leg);
        self.cabin_selections
            .extend(selections.into_iter().filter(|s| s.leg == leg));
        self.detach_pending_booking();
    }

    /// Replaces all meal selections.
    pub fn set_meals(&mut self, meals: Vec<MealSelection>) {
        self.meals = meals;
        self.detach_pending_booking();
    }

    /// Stores a successfully validated promo.
    pub fn apply_promo(&mut self, promo: AppliedPromo) {
        tracing::info!(code = %promo.code, discount = %promo.discount, "promo applied");
        self.promo = Some(promo);
        self.detach_pending_booking();
    }

    /// Clears any applied promo.
    ///
    /// Called on failed validation so a stale discount never stays visible.
    pub fn clear_promo(&mut self) {
        if self.promo.take().is_some() {
            self.detach_pending_booking();
        }
    }

    /// Adds a passenger, or replaces the entry with the same ID.
    pub fn add_passenger(&mut self, passenger: Passenger) {
        if let Some(existing) = self.passengers.iter_mut().find(|p| p.id == passenger.id) {
            *existing = passenger;
        } else {
            self.passengers.push(passenger);
        }
        self.detach_pending_booking();
    }

    /// Patches an existing passenger.
    pub fn update_passenger(
        &mut self,
        id: PassengerId,
        patch: PassengerUpdate,
    ) -> Result<(), BookingError> {
        let passenger = self
            .passengers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BookingError::PassengerNotFound(id))?;
        patch.apply_to(passenger);
        self.detach_pending_booking();
        Ok(())
    }

    /// Removes a passenger.
    pub fn remove_passenger(&mut self, id: PassengerId) -> Result<(), BookingError> {
        let before = self.passengers.len();
        self.passengers.retain(|p| p.id != id);
        if self.passengers.len() == before {
            return Err(BookingError::PassengerNotFound(id));
        }
        self.detach_pending_booking();
        Ok(())
    }

    /// Adds a vehicle, or replaces the entry with the same ID.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        if let Some(existing) = self.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            *existing = vehicle;
        } else {
            self.vehicles.push(vehicle);
        }
        self.detach_pending_booking();
    }

    /// Patches an existing vehicle.
    pub fn update_vehicle(
        &mut self,
        id: VehicleId,
        patch: VehicleUpdate,
    ) -> Result<(), BookingError> {
        let vehicle = self
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(BookingError::VehicleNotFound(id))?;
        patch.apply_to(vehicle);
        self.detach_pending_booking();
        Ok(())
    }

    /// Removes a vehicle.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Result<(), BookingError> {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != id);
        if self.vehicles.len() == before {
            return Err(BookingError::VehicleNotFound(id));
        }
        self.detach_pending_booking();
        Ok(())
    }

    /// Stores the contact details.
    pub fn set_contact_info(&mut self, contact: ContactInfo) {
        self.contact = Some(contact);
    }

    /// Toggles cancellation protection.
    pub fn set_cancellation_protection(&mut self, enabled: bool) {
        self.cancellation_protection = enabled;
        self.detach_pending_booking();
    }

    /// Attaches the booking created by the server for the current
    /// selections.
    pub fn attach_booking(&mut self, booking: PendingBooking) {
        self.pending_booking = Some(booking);
    }

    /// Detaches the in-flight booking reference.
    ///
    /// Any later edit then forces a fresh booking to be created
    /// server-side instead of paying against stale selections.
    pub fn clear_current_booking(&mut self) {
        self.detach_pending_booking();
    }

    /// Clears everything a new search invalidates.
    ///
    /// Search criteria and selected sailings survive; cabin selections,
    /// meals, contact info, passengers, vehicles, promo state, and the
    /// in-flight booking reference do not.
    pub fn clear_downstream(&mut self) {
        self.cabin_selections.clear();
        self.meals.clear();
        self.contact = None;
        self.passengers.clear();
        self.vehicles.clear();
        self.promo = None;
        self.pending_booking = None;
    }

    /// Resets the cart completely (new session or logout).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn detach_pending_booking(&mut self) {
        if let Some(booking) = self.pending_booking.take() {
            tracing::debug!(reference = %booking.reference, "selection changed, detaching pending booking");
        }
    }
}

// Queries
impl BookingCart {
    /// Returns the stored search criteria.
    pub fn search_params(&self) -> Option<&SearchParams> {
        self.search_params.as_ref()
    }

    /// Returns the selected sailing for one leg.
    pub fn sailing_for(&self, leg: Leg) -> Option<&SailingResult> {
        match leg {
            Leg::Outbound => self.outbound.as_ref(),
            Leg::Return => self.return_sailing.as_ref(),
        }
    }

    /// Returns true for a round trip.
    pub fn is_round_trip(&self) -> bool {
        self.round_trip
    }

    /// Returns the cabin selections for one leg.
    pub fn cabin_selections(&self, leg: Leg) -> impl Iterator<Item = &CabinSelection> {
        self.cabin_selections.iter().filter(move |s| s.leg == leg)
    }

    /// Returns all meal selections.
    pub fn meals(&self) -> &[MealSelection] {
        &self.meals
    }

    /// Returns the applied promo, if any.
    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    /// Returns the contact details, if set.
    pub fn contact_info(&self) -> Option<&ContactInfo> {
        self.contact.as_ref()
    }

    /// Returns all passengers.
    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    /// Returns all vehicles.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Returns true if cancellation protection is selected.
    pub fn cancellation_protection(&self) -> bool {
        self.cancellation_protection
    }

    /// Returns the in-flight booking, if one is attached.
    pub fn pending_booking(&self) -> Option<&PendingBooking> {
        self.pending_booking.as_ref()
    }

    /// Sums one leg: passenger fares and vehicle fares at that leg's
    /// tariff, plus that leg's cabin and meal line items.
    ///
    /// A leg with no selected sailing contributes zero.
    pub fn leg_total(&self, leg: Leg) -> Money {
        let Some(sailing) = self.sailing_for(leg) else {
            return Money::zero();
        };

        let passenger_fares: Money = self
            .passengers
            .iter()
            .map(|p| sailing.prices.fare_for(p.passenger_type))
            .sum();
        let vehicle_fares = sailing.prices.vehicle.multiply(self.vehicles.len() as u32);
        let cabins: Money = self
            .cabin_selections(leg)
            .map(CabinSelection::total_price)
            .sum();
        let meals: Money = self
            .meals
            .iter()
            .filter(|m| m.leg == leg)
            .map(MealSelection::total_price)
            .sum();

        passenger_fares + vehicle_fares + cabins + meals
    }

    /// Sums both legs and applies the promo discount, floored at zero.
    ///
    /// This total is provisional: the booking collaborator owns
    /// authoritative pricing, and its response supersedes this sum.
    pub fn provisional_total(&self) -> Money {
        let gross = self.leg_total(Leg::Outbound) + self.leg_total(Leg::Return);
        match &self.promo {
            Some(promo) => gross.saturating_sub(promo.discount),
            None => gross,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use availability::{AvailableSpaces, PassengerType, PriceTable};
    use chrono::TimeZone;

    fn sailing_with_tariff(id: &str, adult_cents: i64, vehicle_cents: i64) -> SailingResult {
        SailingResult {
            id: id.into(),
            route: "HEL-TAL".into(),
            operator: "Nordline".to_string(),
            departure_port: "Helsinki".to_string(),
            arrival_port: "Tallinn".to_string(),
            departure_time: Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2026, 6, 1, 10, 30, 0).unwrap(),
            prices: PriceTable {
                adult: Money::from_cents(adult_cents),
                child: Money::from_cents(adult_cents / 2),
                infant: Money::zero(),
                vehicle: Money::from_cents(vehicle_cents),
            },
            available_spaces: AvailableSpaces {
                passengers: 100,
                vehicles: 20,
                cabins: 10,
            },
            cabin_types: vec![],
        }
    }

    fn round_trip_params() -> SearchParams {
        SearchParams {
            route: "HEL-TAL".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            return_date: Some(NaiveDate::from_ymd_opt(2026, 6, 5).unwrap()),
            adults: 2,
            children: 0,
            infants: 0,
            vehicles: 1,
        }
    }

    fn pending_booking() -> PendingBooking {
        PendingBooking {
            reference: "BK-0001".into(),
            expires_at: Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
            total: Money::from_cents(9900),
        }
    }

    #[test]
    fn test_one_way_selection_drops_return_sailing() {
        let mut cart = BookingCart::new();
        let mut params = round_trip_params();
        cart.set_search_params(params.clone());
        cart.select_sailing(Leg::Return, sailing_with_tariff("R-1", 3000, 5000));
        assert!(cart.sailing_for(Leg::Return).is_some());

        params.return_date = None;
        cart.set_search_params(params);
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));

        assert!(!cart.is_round_trip());
        assert!(cart.sailing_for(Leg::Return).is_none());
    }

    #[test]
    fn test_passenger_upsert_by_id() {
        let mut cart = BookingCart::new();
        let passenger = Passenger::new(PassengerType::Adult, "Anna", "Virtanen");
        let id = passenger.id;

        cart.add_passenger(passenger.clone());
        cart.add_passenger(passenger);
        assert_eq!(cart.passengers().len(), 1);

        cart.update_passenger(
            id,
            PassengerUpdate {
                first_name: Some("Annika".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(cart.passengers()[0].first_name, "Annika");

        cart.remove_passenger(id).unwrap();
        assert!(cart.passengers().is_empty());
        assert!(matches!(
            cart.remove_passenger(id),
            Err(BookingError::PassengerNotFound(_))
        ));
    }

    #[test]
    fn test_vehicle_update_unknown_id_fails() {
        let mut cart = BookingCart::new();
        let result = cart.update_vehicle(VehicleId::new(), VehicleUpdate::default());
        assert!(matches!(result, Err(BookingError::VehicleNotFound(_))));
    }

    #[test]
    fn test_cabin_selections_replace_per_leg() {
        let mut cart = BookingCart::new();
        cart.set_cabin_selections(
            Leg::Outbound,
            vec![CabinSelection::new(
                "inside_twin",
                1,
                Money::from_cents(8000),
                Leg::Outbound,
            )],
        );
        cart.set_cabin_selections(
            Leg::Return,
            vec![CabinSelection::new(
                "suite",
                1,
                Money::from_cents(25000),
                Leg::Return,
            )],
        );

        // Replacing the outbound list leaves the return list alone.
        cart.set_cabin_selections(
            Leg::Outbound,
            vec![CabinSelection::new(
                "outside_twin",
                2,
                Money::from_cents(11000),
                Leg::Outbound,
            )],
        );

        let outbound: Vec<_> = cart.cabin_selections(Leg::Outbound).collect();
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].cabin_id, "outside_twin");
        assert_eq!(cart.cabin_selections(Leg::Return).count(), 1);
    }

    #[test]
    fn test_round_trip_total_prices_each_leg_by_its_own_tariff() {
        let mut cart = BookingCart::new();
        cart.set_search_params(round_trip_params());
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));
        cart.select_sailing(Leg::Return, sailing_with_tariff("R-1", 4000, 6000));

        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Mikko", "Virtanen"));
        cart.add_vehicle(Vehicle::new("car", 450, 180, 160, "ABC-123"));

        cart.set_cabin_selections(
            Leg::Outbound,
            vec![CabinSelection::new(
                "inside_twin",
                1,
                Money::from_cents(8000),
                Leg::Outbound,
            )],
        );
        cart.set_meals(vec![MealSelection::new(
            "breakfast",
            "Breakfast buffet",
            2,
            Money::from_cents(1500),
            Leg::Return,
        )]);

        // Outbound: 2 adults x 30.00 + vehicle 50.00 + cabin 80.00
        assert_eq!(cart.leg_total(Leg::Outbound).cents(), 19000);
        // Return: 2 adults x 40.00 + vehicle 60.00 + meals 30.00
        assert_eq!(cart.leg_total(Leg::Return).cents(), 17000);
        assert_eq!(cart.provisional_total().cents(), 36000);
    }

    #[test]
    fn test_no_return_sailing_means_zero_return_charges() {
        let mut cart = BookingCart::new();
        cart.set_search_params(round_trip_params());
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));

        assert_eq!(cart.leg_total(Leg::Return), Money::zero());
        assert_eq!(cart.provisional_total().cents(), 3000);
    }

    #[test]
    fn test_promo_discount_floors_at_zero() {
        let mut cart = BookingCart::new();
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));

        cart.apply_promo(AppliedPromo {
            code: "EVERYTHING".to_string(),
            discount: Money::from_cents(99999),
            message: "Discount applied".to_string(),
        });

        assert_eq!(cart.provisional_total(), Money::zero());

        cart.clear_promo();
        assert!(cart.promo().is_none());
        assert_eq!(cart.provisional_total().cents(), 3000);
    }

    #[test]
    fn test_priced_edits_detach_pending_booking() {
        let mut cart = BookingCart::new();
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));

        cart.attach_booking(pending_booking());
        assert!(cart.pending_booking().is_some());

        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        assert!(cart.pending_booking().is_none());

        cart.attach_booking(pending_booking());
        cart.set_cancellation_protection(true);
        assert!(cart.pending_booking().is_none());

        // Contact edits do not change the price and keep the booking.
        cart.attach_booking(pending_booking());
        cart.set_contact_info(ContactInfo::default());
        assert!(cart.pending_booking().is_some());

        cart.clear_current_booking();
        assert!(cart.pending_booking().is_none());
    }

    #[test]
    fn test_clear_downstream_keeps_search_and_sailings() {
        let mut cart = BookingCart::new();
        cart.set_search_params(round_trip_params());
        cart.select_sailing(Leg::Outbound, sailing_with_tariff("O-1", 3000, 5000));
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        cart.add_vehicle(Vehicle::new("car", 450, 180, 160, "ABC-123"));
        cart.set_meals(vec![MealSelection::new(
            "breakfast",
            "Breakfast buffet",
            1,
            Money::from_cents(1500),
            Leg::Outbound,
        )]);
        cart.set_contact_info(ContactInfo::default());
        cart.apply_promo(AppliedPromo {
            code: "SUMMER".to_string(),
            discount: Money::from_cents(500),
            message: "ok".to_string(),
        });
        cart.attach_booking(pending_booking());

        cart.clear_downstream();

        assert!(cart.search_params().is_some());
        assert!(cart.sailing_for(Leg::Outbound).is_some());
        assert!(cart.passengers().is_empty());
        assert!(cart.vehicles().is_empty());
        assert_eq!(cart.cabin_selections(Leg::Outbound).count(), 0);
        assert!(cart.meals().is_empty());
        assert!(cart.contact_info().is_none());
        assert!(cart.promo().is_none());
        assert!(cart.pending_booking().is_none());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut cart = BookingCart::new();
        cart.set_search_params(round_trip_params());
        cart.set_cancellation_protection(true);
        cart.reset();

        assert!(cart.search_params().is_none());
        assert!(!cart.cancellation_protection());
        assert!(!cart.is_round_trip());
    }
}
