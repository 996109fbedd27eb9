//! Demo shell: drives a scripted checkout against in-memory collaborators.

use availability::wire::{AvailabilityEvent, WireAvailability};
use availability::{
    AvailableSpaces, CabinBucket, ChangeType, DeltaSource, PassengerType, PriceTable,
    SailingResult, ServerMessage,
};
use booking::{CabinSelection, ContactInfo, Leg, Passenger, SearchParams};
use channel::{AvailabilityChannel, ChannelConfig, InMemoryTransport};
use chrono::{NaiveDate, TimeZone, Utc};
use client::{
    BookingController, ClientConfig, InMemoryBookingGateway, InMemoryPromoApi, InMemorySearchApi,
};
use common::Money;
use session::InMemorySessionStore;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn demo_sailings() -> Vec<SailingResult> {
    vec![
        SailingResult {
            id: "VIK-7781".into(),
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
                CabinBucket::new("suite", 6, Money::from_cents(25000)),
            ],
        },
        SailingResult {
            id: "VIK-7795".into(),
            route: "HEL-TAL".into(),
            operator: "Nordline".to_string(),
            departure_port: "Helsinki".to_string(),
            arrival_port: "Tallinn".to_string(),
            departure_time: Utc.with_ymd_and_hms(2026, 9, 1, 14, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2026, 9, 1, 16, 30, 0).unwrap(),
            prices: PriceTable {
                adult: Money::from_cents(2900),
                child: Money::from_cents(1500),
                infant: Money::zero(),
                vehicle: Money::from_cents(5500),
            },
            available_spaces: AvailableSpaces {
                passengers: 380,
                vehicles: 64,
                cabins: 12,
            },
            cabin_types: vec![
                CabinBucket::new("deck", 180, Money::zero()),
                CabinBucket::new("inside_twin", 12, Money::from_cents(7000)),
            ],
        },
    ]
}

#[tokio::main]
async fn main() {
    let config = ClientConfig::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Collaborators and the push channel (in-memory for the demo; the
    //    production shell points WebSocketTransport at config.push_endpoint)
    let search_api = InMemorySearchApi::new();
    search_api.set_sailings(demo_sailings());
    let promo_api = InMemoryPromoApi::new();
    promo_api.register_code("SUMMER10", Money::from_cents(1000), "10.00 off your trip");
    let gateway = InMemoryBookingGateway::new();
    let artifacts = InMemorySessionStore::new();
    artifacts.seed_legacy_cart(r#"{"passengers":[]}"#);

    let transport = InMemoryTransport::new();
    let (push, mut deltas) = AvailabilityChannel::connect(
        transport.clone(),
        vec!["HEL-TAL".into()],
        ChannelConfig::default(),
    );
    tracing::info!(endpoint = %config.push_endpoint, "demo shell starting");

    let mut controller = BookingController::new(search_api, promo_api, gateway, artifacts);

    // 4. Search and select
    let count = controller
        .run_search(SearchParams {
            route: "HEL-TAL".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
            return_date: None,
            adults: 2,
            children: 0,
            infants: 0,
            vehicles: 0,
        })
        .await
        .expect("search failed");
    tracing::info!(count, "search results cached");

    controller
        .select_sailing(Leg::Outbound, &"VIK-7781".into())
        .expect("sailing missing");
    controller.proceed_to_details().expect("no sailing selected");

    // 5. Another traveler books a cabin while we fill in details
    transport.last_server().expect("channel not connected").push(
        ServerMessage::AvailabilityUpdate {
            data: AvailabilityEvent {
                sailing_id: "VIK-7781".into(),
                route: "HEL-TAL".into(),
                departure_time: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
                availability: WireAvailability {
                    change_type: ChangeType::BookingCreated,
                    passengers_booked: Some(2),
                    passengers_freed: None,
                    vehicles_booked: None,
                    vehicles_freed: None,
                    cabin_quantity: Some(1),
                    cabins_freed: None,
                    booking_reference: None,
                },
                source: DeltaSource::External,
                updated_at: Utc::now(),
            },
        },
    );
    if let Some(notification) = deltas.recv().await {
        controller.apply_availability(&notification);
        let sailing = controller
            .cache()
            .get(&notification.sailing_id)
            .expect("sailing dropped from cache");
        tracing::info!(
            passengers = sailing.available_spaces.passengers,
            cabins = sailing.available_spaces.cabins,
            "availability reconciled"
        );
    }

    // 6. Details, promo, payment
    controller.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
    controller.add_passenger(Passenger::new(PassengerType::Adult, "Mikko", "Virtanen"));
    controller.set_cabin_selections(
        Leg::Outbound,
        vec![CabinSelection::new(
            "inside_twin",
            1,
            Money::from_cents(8000),
            Leg::Outbound,
        )],
    );
    controller.set_contact_info(ContactInfo {
        email: "anna@example.com".to_string(),
        phone: "+358401234567".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Virtanen".to_string(),
        ..Default::default()
    });
    let validation = controller
        .apply_promo_code("SUMMER10")
        .await
        .expect("promo service failed");
    tracing::info!(message = %validation.message, "promo validated");

    let step = controller
        .proceed_to_payment()
        .await
        .expect("booking creation failed");
    let pending = controller.cart().pending_booking().expect("no booking");
    tracing::info!(
        %step,
        reference = %pending.reference,
        total = %pending.total,
        countdown = controller.countdown().map(|c| c.display).unwrap_or_default(),
        "payment session open"
    );

    let step = controller.confirm_payment().await.expect("payment failed");
    tracing::info!(%step, "booking confirmed");

    // 7. Tear down the channel and dump the metrics this run produced
    push.shutdown().await;
    print!("{}", metrics_handle.render());
}
