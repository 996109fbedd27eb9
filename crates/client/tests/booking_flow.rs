//! Integration tests for the full checkout flow.
//!
//! These exercise the controller against the in-memory collaborators:
//! search, selection, details, payment, confirmation, and the failure
//! branches around each.

use availability::{
    AvailabilityDelta, AvailableSpaces, CabinBucket, ChangeType, DeltaSource, PassengerType,
    PriceTable, SailingResult,
};
use booking::{CabinSelection, CheckoutStep, ContactInfo, Leg, Passenger, SearchParams};
use channel::DeltaNotification;
use chrono::{NaiveDate, TimeZone, Utc};
use client::{
    BookingController, BookingStatus, InMemoryBookingGateway, InMemoryPromoApi, InMemorySearchApi,
};
use common::Money;
use session::{InMemorySessionStore, SessionArtifacts};

type Controller = BookingController<
    InMemorySearchApi,
    InMemoryPromoApi,
    InMemoryBookingGateway,
    InMemorySessionStore,
>;

fn sailing(id: &str) -> SailingResult {
    SailingResult {
        id: id.into(),
        route: "HEL-TAL".into(),
        operator: "Nordline".to_string(),
        departure_port: "Helsinki".to_string(),
        arrival_port: "Tallinn".to_string(),
        departure_time: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
        arrival_time: Utc.with_ymd_and_hms(2026, 9, 1, 10, 30, 0).unwrap(),
        prices: PriceTable {
            adult: Money::from_cents(3500),
            child: Money::from_cents(1800),
            infant: Money::zero(),
            vehicle: Money::from_cents(6000),
        },
        available_spaces: AvailableSpaces {
            passengers: 420,
            vehicles: 80,
            cabins: 24,
        },
        cabin_types: vec![
            CabinBucket::new("deck", 200, Money::zero()),
            CabinBucket::new("inside_twin", 18, Money::from_cents(8000)),
        ],
    }
}

fn one_way_params() -> SearchParams {
    SearchParams {
        route: "HEL-TAL".into(),
        departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        return_date: None,
        adults: 2,
        children: 0,
        infants: 0,
        vehicles: 0,
    }
}

fn valid_contact() -> ContactInfo {
    ContactInfo {
        email: "anna@example.com".to_string(),
        phone: "+358401234567".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Virtanen".to_string(),
        ..Default::default()
    }
}

fn setup() -> (
    Controller,
    InMemorySearchApi,
    InMemoryPromoApi,
    InMemoryBookingGateway,
    InMemorySessionStore,
) {
    let search_api = InMemorySearchApi::new();
    search_api.set_sailings(vec![sailing("VIK-1"), sailing("VIK-2")]);
    let promo_api = InMemoryPromoApi::new();
    let gateway = InMemoryBookingGateway::new();
    let artifacts = InMemorySessionStore::new();

    let controller = BookingController::new(
        search_api.clone(),
        promo_api.clone(),
        gateway.clone(),
        artifacts.clone(),
    );
    (controller, search_api, promo_api, gateway, artifacts)
}

/// Drives a controller from fresh state to the details step with a
/// payable cart.
async fn fill_details(controller: &mut Controller) {
    controller.run_search(one_way_params()).await.unwrap();
    controller
        .select_sailing(Leg::Outbound, &"VIK-1".into())
        .unwrap();
    controller.proceed_to_details().unwrap();
    controller.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
    controller.add_passenger(Passenger::new(PassengerType::Adult, "Mikko", "Virtanen"));
    controller.set_contact_info(valid_contact());
}

mod happy_path {
    use super::*;

    #[tokio::test]
    async fn search_to_confirmation() {
        let (mut controller, _, _, gateway, artifacts) = setup();
        assert_eq!(controller.step(), CheckoutStep::Search);

        let count = controller.run_search(one_way_params()).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(controller.step(), CheckoutStep::SelectFerry);

        controller
            .select_sailing(Leg::Outbound, &"VIK-1".into())
            .unwrap();
        assert_eq!(
            controller.proceed_to_details().unwrap(),
            CheckoutStep::BookingDetails
        );

        controller.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        controller.set_contact_info(valid_contact());
        controller.set_cabin_selections(
            Leg::Outbound,
            vec![CabinSelection::new(
                "inside_twin",
                1,
                Money::from_cents(8000),
                Leg::Outbound,
            )],
        );

        let step = controller.proceed_to_payment().await.unwrap();
        assert_eq!(step, CheckoutStep::Payment);
        assert_eq!(gateway.booking_count(), 1);

        // The server total supersedes the provisional sum and the session
        // marker is cached.
        let pending = controller.cart().pending_booking().unwrap();
        assert_eq!(pending.total.cents(), 3500 + 8000);
        assert!(artifacts.pending_booking().is_some());
        assert!(controller.countdown().is_some());

        let step = controller.confirm_payment().await.unwrap();
        assert_eq!(step, CheckoutStep::Confirmation);
        assert!(controller.step().is_terminal());
        assert!(artifacts.pending_booking().is_none());
        assert!(controller.countdown().is_none());
    }

    #[tokio::test]
    async fn settled_booking_short_circuits_to_confirmation() {
        let (mut controller, _, _, gateway, artifacts) = setup();
        gateway.set_status_on_create(BookingStatus::Confirmed);

        fill_details(&mut controller).await;
        let step = controller.proceed_to_payment().await.unwrap();

        assert_eq!(step, CheckoutStep::Confirmation);
        assert!(artifacts.pending_booking().is_none());
        assert!(controller.countdown().is_none());
    }
}

mod failure_paths {
    use super::*;

    #[tokio::test]
    async fn incomplete_details_block_payment_and_name_the_section() {
        let (mut controller, _, _, gateway, _) = setup();
        controller.run_search(one_way_params()).await.unwrap();
        controller
            .select_sailing(Leg::Outbound, &"VIK-1".into())
            .unwrap();
        controller.proceed_to_details().unwrap();

        let error = controller.proceed_to_payment().await.unwrap_err();
        let client::ClientError::Validation(report) = error else {
            panic!("expected validation error");
        };
        assert_eq!(
            report.first_invalid_section(),
            Some(booking::Section::Passengers)
        );
        assert_eq!(controller.step(), CheckoutStep::BookingDetails);
        assert_eq!(gateway.booking_count(), 0);
    }

    #[tokio::test]
    async fn booking_failure_keeps_cart_and_refetches_availability() {
        let (mut controller, search_api, _, gateway, _) = setup();
        fill_details(&mut controller).await;
        let searches_before = search_api.search_count();

        gateway.set_fail_on_create(true);
        let error = controller.proceed_to_payment().await.unwrap_err();
        assert!(matches!(error, client::ClientError::Booking(_)));

        // Cart untouched, step unchanged, availability re-fetched.
        assert_eq!(controller.cart().passengers().len(), 2);
        assert_eq!(controller.step(), CheckoutStep::BookingDetails);
        assert_eq!(search_api.search_count(), searches_before + 1);

        // Retry succeeds without re-entering anything.
        gateway.set_fail_on_create(false);
        let step = controller.proceed_to_payment().await.unwrap();
        assert_eq!(step, CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn failed_promo_clears_previous_discount() {
        let (mut controller, _, promo_api, _, _) = setup();
        promo_api.register_code("SUMMER10", Money::from_cents(1000), "10.00 off");
        fill_details(&mut controller).await;

        let validation = controller.apply_promo_code("SUMMER10").await.unwrap();
        assert!(validation.is_valid);
        assert!(controller.cart().promo().is_some());
        let discounted = controller.cart().provisional_total();

        let validation = controller.apply_promo_code("WRONG").await.unwrap();
        assert!(!validation.is_valid);
        assert!(controller.cart().promo().is_none());
        assert_eq!(
            controller.cart().provisional_total().cents(),
            discounted.cents() + 1000
        );
    }

    #[tokio::test]
    async fn promo_service_outage_also_clears_discount() {
        let (mut controller, _, promo_api, _, _) = setup();
        promo_api.register_code("SUMMER10", Money::from_cents(1000), "10.00 off");
        fill_details(&mut controller).await;

        controller.apply_promo_code("SUMMER10").await.unwrap();
        promo_api.set_fail_on_validate(true);

        let result = controller.apply_promo_code("SUMMER10").await;
        assert!(result.is_err());
        assert!(controller.cart().promo().is_none());
    }

    #[tokio::test]
    async fn payment_declined_keeps_pending_booking_for_retry() {
        let (mut controller, _, _, gateway, _) = setup();
        fill_details(&mut controller).await;
        controller.proceed_to_payment().await.unwrap();

        gateway.set_fail_on_confirm(true);
        assert!(controller.confirm_payment().await.is_err());
        assert_eq!(controller.step(), CheckoutStep::Payment);
        assert!(controller.cart().pending_booking().is_some());

        gateway.set_fail_on_confirm(false);
        let step = controller.confirm_payment().await.unwrap();
        assert_eq!(step, CheckoutStep::Confirmation);
    }
}

mod navigation {
    use super::*;

    #[tokio::test]
    async fn forward_step_clicks_never_navigate() {
        let (mut controller, _, _, _, _) = setup();
        controller.run_search(one_way_params()).await.unwrap();
        assert_eq!(controller.step(), CheckoutStep::SelectFerry);

        assert_eq!(
            controller.go_to_step(CheckoutStep::Payment, true),
            CheckoutStep::SelectFerry
        );
        assert_eq!(
            controller.go_to_step(CheckoutStep::Confirmation, true),
            CheckoutStep::SelectFerry
        );
    }

    #[tokio::test]
    async fn backward_clicks_honor_the_back_policy() {
        let (mut controller, _, _, _, _) = setup();
        fill_details(&mut controller).await;
        assert_eq!(controller.step(), CheckoutStep::BookingDetails);

        assert_eq!(
            controller.go_to_step(CheckoutStep::SelectFerry, false),
            CheckoutStep::BookingDetails
        );
        assert_eq!(
            controller.go_to_step(CheckoutStep::SelectFerry, true),
            CheckoutStep::SelectFerry
        );
    }

    #[tokio::test]
    async fn start_new_search_resets_downstream_from_any_state() {
        let (mut controller, _, promo_api, _, artifacts) = setup();
        promo_api.register_code("SUMMER10", Money::from_cents(1000), "10.00 off");
        fill_details(&mut controller).await;
        controller.apply_promo_code("SUMMER10").await.unwrap();
        controller.proceed_to_payment().await.unwrap();
        assert_eq!(controller.step(), CheckoutStep::Payment);

        controller.start_new_search();

        assert_eq!(controller.step(), CheckoutStep::SelectFerry);
        let cart = controller.cart();
        assert!(cart.passengers().is_empty());
        assert!(cart.vehicles().is_empty());
        assert_eq!(cart.cabin_selections(Leg::Outbound).count(), 0);
        assert!(cart.meals().is_empty());
        assert!(cart.promo().is_none());
        assert!(cart.pending_booking().is_none());
        assert!(artifacts.pending_booking().is_none());
        assert!(controller.countdown().is_none());
    }
}

mod concurrency {
    use super::*;

    fn notification(sailing_id: &str, delta: AvailabilityDelta) -> DeltaNotification {
        DeltaNotification {
            sailing_id: sailing_id.into(),
            route: "HEL-TAL".into(),
            delta,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn pushed_deltas_reconcile_mid_flow() {
        let (mut controller, _, _, _, _) = setup();
        fill_details(&mut controller).await;

        let delta = AvailabilityDelta::new(ChangeType::BookingCreated, DeltaSource::External)
            .with_passengers_booked(20)
            .with_cabin_quantity(2);
        controller.apply_availability(&notification("VIK-1", delta));

        let cached = controller.cache().get(&"VIK-1".into()).unwrap();
        assert_eq!(cached.available_spaces.passengers, 400);
        assert_eq!(cached.available_spaces.cabins, 22);
        assert_eq!(cached.cabin_bucket("inside_twin").unwrap().available, 16);

        // The selected snapshot in the cart keeps its quoted tariff; the
        // reconciler only touches the cache.
        assert_eq!(
            controller
                .cart()
                .sailing_for(Leg::Outbound)
                .unwrap()
                .available_spaces
                .passengers,
            420
        );
    }

    #[tokio::test]
    async fn unknown_sailing_delta_is_ignored() {
        let (mut controller, _, _, _, _) = setup();
        controller.run_search(one_way_params()).await.unwrap();

        let delta = AvailabilityDelta::new(ChangeType::Sync, DeltaSource::External)
            .with_passengers_freed(5);
        let outcome = controller.apply_availability(&notification("NO-SUCH", delta));
        assert_eq!(outcome, availability::ReconcileOutcome::Unmatched);
    }
}

mod session_expiry {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn lapsed_session_detaches_the_booking_once() {
        let (mut controller, _, _, gateway, artifacts) = setup();
        gateway.set_session_ttl(chrono::Duration::seconds(5));
        fill_details(&mut controller).await;
        controller.proceed_to_payment().await.unwrap();
        assert!(!controller.poll_session_expiry());

        // The 1-second ticks run on the paused clock until the deadline.
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(controller.poll_session_expiry());
        assert!(controller.cart().pending_booking().is_none());
        assert!(artifacts.pending_booking().is_none());
        assert!(!controller.poll_session_expiry());
    }
}

mod boot {
    use super::*;

    #[tokio::test]
    async fn legacy_persisted_cart_is_purged_at_boot() {
        let search_api = InMemorySearchApi::new();
        let promo_api = InMemoryPromoApi::new();
        let gateway = InMemoryBookingGateway::new();
        let artifacts = InMemorySessionStore::new();
        artifacts.seed_legacy_cart(r#"{"passengers":[{"firstName":"Old"}]}"#);

        let _controller =
            BookingController::new(search_api, promo_api, gateway, artifacts.clone());

        assert!(!artifacts.has_legacy_cart());
    }
}
