//! The root booking controller.
//!
//! One controller instance owns the cart, the search cache, the checkout
//! step, and the payment countdown. Screens read through the accessor
//! methods; every mutation funnels through the command methods, so the
//! single-writer discipline holds without any global state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use availability::{ReconcileOutcome, SearchCache};
use booking::{
    AppliedPromo, BookingCart, CabinSelection, CheckoutStep, ContactInfo, Leg, MealSelection,
    Passenger, PassengerUpdate, PendingBooking, SearchParams, Vehicle, VehicleUpdate,
    validate_for_payment,
};
use channel::DeltaNotification;
use chrono::Utc;
use common::{PassengerId, SailingId, VehicleId};
use session::{CountdownSnapshot, ExpirationTimer, SessionArtifacts, StoredBookingMarker};

use crate::error::ClientError;
use crate::services::booking::{BookingGateway, BookingRecord};
use crate::services::promo::{PromoRequest, PromoValidation, PromoValidator};
use crate::services::search::SearchApi;

/// Drives the checkout flow against the collaborator services.
pub struct BookingController<S, P, G, A>
where
    S: SearchApi,
    P: PromoValidator,
    G: BookingGateway,
    A: SessionArtifacts,
{
    search_api: S,
    promo_api: P,
    gateway: G,
    artifacts: A,
    cart: BookingCart,
    cache: SearchCache,
    step: CheckoutStep,
    timer: Option<ExpirationTimer>,
    session_expired: Arc<AtomicBool>,
}

impl<S, P, G, A> BookingController<S, P, G, A>
where
    S: SearchApi,
    P: PromoValidator,
    G: BookingGateway,
    A: SessionArtifacts,
{
    /// Creates a controller and purges any legacy persisted cart.
    pub fn new(search_api: S, promo_api: P, gateway: G, artifacts: A) -> Self {
        artifacts.purge_legacy_cart();
        Self {
            search_api,
            promo_api,
            gateway,
            artifacts,
            cart: BookingCart::new(),
            cache: SearchCache::new(),
            step: CheckoutStep::Search,
            timer: None,
            session_expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs a search: everything downstream is invalidated, the cache is
    /// reseeded, and the flow lands on the sailing-selection step.
    #[tracing::instrument(skip(self, params), fields(route = %params.route))]
    pub async fn run_search(&mut self, params: SearchParams) -> Result<usize, ClientError> {
        self.start_new_search();
        self.cart.set_search_params(params.clone());

        let results = self.search_api.search(&params).await?;
        let count = results.len();
        self.cache.seed(results, Utc::now());
        metrics::counter!("searches_total").increment(1);

        Ok(count)
    }

    /// Resets to the sailing-selection step, clearing cabin selections,
    /// meals, contact info, passengers, vehicles, promo state, and any
    /// in-flight booking reference.
    pub fn start_new_search(&mut self) {
        self.step = CheckoutStep::SelectFerry;
        self.cart.clear_downstream();
        self.artifacts.clear_pending_booking();
        self.stop_timer();
    }

    /// Selects a sailing from the current results for one leg.
    pub fn select_sailing(&mut self, leg: Leg, sailing_id: &SailingId) -> Result<(), ClientError> {
        let sailing = self
            .cache
            .get(sailing_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownSailing(sailing_id.clone()))?;
        self.cart.select_sailing(leg, sailing);
        Ok(())
    }

    /// Moves from sailing selection to the details step.
    pub fn proceed_to_details(&mut self) -> Result<CheckoutStep, ClientError> {
        if self.cart.sailing_for(Leg::Outbound).is_none() {
            return Err(ClientError::NoSailingSelected);
        }
        self.step = CheckoutStep::BookingDetails;
        Ok(self.step)
    }

    /// Validates the cart, creates the booking, and enters the payment
    /// step with the countdown running.
    ///
    /// A booking whose status is already settled short-circuits straight
    /// to confirmation. On a collaborator failure the cart is left
    /// intact for retry and the cached availability is re-fetched, since
    /// the optimistic local deltas cannot be rolled back.
    #[tracing::instrument(skip(self))]
    pub async fn proceed_to_payment(&mut self) -> Result<CheckoutStep, ClientError> {
        let report = validate_for_payment(&self.cart);
        if !report.is_valid() {
            tracing::info!(
                section = ?report.first_invalid_section(),
                issues = report.issues.len(),
                "details incomplete, staying on details step"
            );
            return Err(ClientError::Validation(report));
        }

        // An untouched booking is still payable; don't create another.
        if let Some(expires_at) = self.cart.pending_booking().map(|p| p.expires_at) {
            self.start_countdown(expires_at);
            self.step = CheckoutStep::Payment;
            return Ok(self.step);
        }

        let created = self.gateway.create_booking(&self.cart).await;
        let record = match created {
            Ok(record) => record,
            Err(e) => {
                self.refetch_availability().await;
                return Err(e);
            }
        };

        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(reference = %record.reference, total = %record.total_amount, "booking created");
        self.attach_record(&record);

        if record.status.is_settled() {
            self.finish_confirmed();
            return Ok(self.step);
        }

        self.start_countdown(record.expires_at);
        self.step = CheckoutStep::Payment;
        Ok(self.step)
    }

    /// Confirms payment for the in-flight booking.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(&mut self) -> Result<CheckoutStep, ClientError> {
        let reference = self
            .cart
            .pending_booking()
            .map(|pending| pending.reference.clone())
            .ok_or(ClientError::NoPendingBooking)?;

        let record = self.gateway.confirm_payment(&reference).await?;
        if !record.status.is_settled() {
            return Err(ClientError::Booking(format!(
                "payment not confirmed, booking is {:?}",
                record.status
            )));
        }

        self.finish_confirmed();
        Ok(self.step)
    }

    /// Validates a promo code against the current totals.
    ///
    /// A failed validation, whether an invalid code or a collaborator
    /// error, clears
    /// any previously applied discount.
    #[tracing::instrument(skip(self))]
    pub async fn apply_promo_code(&mut self, code: &str) -> Result<PromoValidation, ClientError> {
        let request = PromoRequest {
            code: code.to_string(),
            booking_amount: self.cart.provisional_total(),
            email: self.cart.contact_info().map(|c| c.email.clone()),
            operator: self
                .cart
                .sailing_for(Leg::Outbound)
                .map(|s| s.operator.clone()),
        };

        let validation = match self.promo_api.validate(request).await {
            Ok(validation) => validation,
            Err(e) => {
                self.cart.clear_promo();
                return Err(e);
            }
        };

        if validation.is_valid {
            self.cart.apply_promo(AppliedPromo {
                code: validation.code.clone(),
                discount: validation.discount_amount,
                message: validation.message.clone(),
            });
        } else {
            tracing::info!(code, message = %validation.message, "promo rejected");
            self.cart.clear_promo();
        }

        Ok(validation)
    }

    /// Handles a click on a step indicator.
    ///
    /// Steps ahead of the current one never navigate; steps at or behind
    /// it navigate only when `can_go_back` is granted.
    pub fn go_to_step(&mut self, target: CheckoutStep, can_go_back: bool) -> CheckoutStep {
        if let Some(step) = self.step.navigate(target, can_go_back) {
            self.step = step;
        }
        self.step
    }

    /// Folds one pushed availability delta into the cached results.
    pub fn apply_availability(&mut self, notification: &DeltaNotification) -> ReconcileOutcome {
        self.cache
            .apply(&notification.sailing_id, &notification.delta)
    }

    /// Checks whether the payment session lapsed since the last poll.
    ///
    /// On expiry the in-flight booking and its session marker are
    /// dropped, so the next attempt creates a fresh booking.
    pub fn poll_session_expiry(&mut self) -> bool {
        if !self.session_expired.swap(false, Ordering::SeqCst) {
            return false;
        }
        tracing::info!("payment session lapsed, detaching booking");
        self.cart.clear_current_booking();
        self.artifacts.clear_pending_booking();
        self.stop_timer();
        true
    }

    /// Clears all session state (logout).
    pub fn logout(&mut self) {
        self.cart.reset();
        self.cache.clear();
        self.step = CheckoutStep::Search;
        self.artifacts.clear_pending_booking();
        self.stop_timer();
    }

    fn attach_record(&mut self, record: &BookingRecord) {
        self.cart.attach_booking(PendingBooking {
            reference: record.reference.clone(),
            expires_at: record.expires_at,
            total: record.total_amount,
        });
        self.artifacts.store_pending_booking(StoredBookingMarker {
            reference: record.reference.clone(),
            expires_at: record.expires_at,
        });
    }

    fn finish_confirmed(&mut self) {
        self.step = CheckoutStep::Confirmation;
        self.artifacts.clear_pending_booking();
        self.stop_timer();
    }

    fn start_countdown(&mut self, expires_at: chrono::DateTime<Utc>) {
        self.stop_timer();
        self.session_expired.store(false, Ordering::SeqCst);
        let expired = Arc::clone(&self.session_expired);
        self.timer = Some(ExpirationTimer::spawn(expires_at, move || {
            expired.store(true, Ordering::SeqCst);
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    async fn refetch_availability(&mut self) {
        let Some(params) = self.cart.search_params().cloned() else {
            return;
        };
        match self.search_api.search(&params).await {
            Ok(results) => {
                tracing::info!(count = results.len(), "re-fetched availability after booking failure");
                self.cache.seed(results, Utc::now());
            }
            Err(e) => tracing::warn!(error = %e, "availability re-fetch failed"),
        }
    }
}

// Cart command pass-throughs and read access
impl<S, P, G, A> BookingController<S, P, G, A>
where
    S: SearchApi,
    P: PromoValidator,
    G: BookingGateway,
    A: SessionArtifacts,
{
    /// Returns the current checkout step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Returns the cart for reading.
    pub fn cart(&self) -> &BookingCart {
        &self.cart
    }

    /// Returns the search cache for reading.
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Returns the latest countdown snapshot while a session is running.
    pub fn countdown(&self) -> Option<CountdownSnapshot> {
        self.timer.as_ref().map(ExpirationTimer::snapshot)
    }

    /// Replaces the cabin selections for one leg.
    pub fn set_cabin_selections(&mut self, leg: Leg, selections: Vec<CabinSelection>) {
        self.cart.set_cabin_selections(leg, selections);
    }

    /// Replaces all meal selections.
    pub fn set_meals(&mut self, meals: Vec<MealSelection>) {
        self.cart.set_meals(meals);
    }

    /// Adds or replaces a passenger.
    pub fn add_passenger(&mut self, passenger: Passenger) {
        self.cart.add_passenger(passenger);
    }

    /// Patches a passenger.
    pub fn update_passenger(
        &mut self,
        id: PassengerId,
        patch: PassengerUpdate,
    ) -> Result<(), ClientError> {
        self.cart.update_passenger(id, patch).map_err(Into::into)
    }

    /// Removes a passenger.
    pub fn remove_passenger(&mut self, id: PassengerId) -> Result<(), ClientError> {
        self.cart.remove_passenger(id).map_err(Into::into)
    }

    /// Adds or replaces a vehicle.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.cart.add_vehicle(vehicle);
    }

    /// Patches a vehicle.
    pub fn update_vehicle(
        &mut self,
        id: VehicleId,
        patch: VehicleUpdate,
    ) -> Result<(), ClientError> {
        self.cart.update_vehicle(id, patch).map_err(Into::into)
    }

    /// Removes a vehicle.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Result<(), ClientError> {
        self.cart.remove_vehicle(id).map_err(Into::into)
    }

    /// Stores the contact details.
    pub fn set_contact_info(&mut self, contact: ContactInfo) {
        self.cart.set_contact_info(contact);
    }

    /// Toggles cancellation protection.
    pub fn set_cancellation_protection(&mut self, enabled: bool) {
        self.cart.set_cancellation_protection(enabled);
    }

    /// Detaches the in-flight booking reference.
    pub fn clear_current_booking(&mut self) {
        self.cart.clear_current_booking();
        self.artifacts.clear_pending_booking();
    }
}
