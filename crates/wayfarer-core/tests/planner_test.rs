#![allow(clippy::unwrap_used)]
// Integration tests for `Planner` against a wiremock backend.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayfarer_core::{
    CoreError, HoldState, IdempotencyKey, Planner, PlannerConfig, PlannerEvent, build_reservation_item,
    build_swap,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Planner) {
    let server = MockServer::start().await;
    let config = PlannerConfig::new(Url::parse(&server.uri()).unwrap())
        .with_token(SecretString::from("test-token".to_owned()));
    let planner = Planner::new(&config).unwrap();
    (server, planner)
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Arc<PlannerEvent>>) -> Vec<PlannerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push((*event).clone());
    }
    events
}

fn trip_body(hotel: &str) -> serde_json::Value {
    json!({
        "success": true,
        "itinerary": {
            "id": "trip_001",
            "status": "draft",
            "input": { "destination": "Jaipur" },
            "summary": { "days": [ { "activities": [ { "id": hotel, "type": "hotel" } ] } ] }
        }
    })
}

// ── Customization ───────────────────────────────────────────────────

#[tokio::test]
async fn test_apply_refetches_trip() {
    let (server, planner) = setup().await;
    let mut rx = planner.events();

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/customize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            // Stale echo: the planner must not trust it.
            "updatedTrip": { "id": "trip_001", "summary": { "days": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/trips/trip_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trip_body("mock_ht_2")))
        .expect(1)
        .mount(&server)
        .await;

    let swap = build_swap("hotel", "ht_1", "mock_ht_2", None).unwrap();
    let trip = planner.apply("trip_001", &[swap]).await.unwrap();

    assert!(trip.find_item("mock_ht_2").is_some());
    assert_eq!(
        drain(&mut rx),
        vec![PlannerEvent::TripUpdated {
            trip_id: "trip_001".into(),
            actions: 1
        }]
    );

    let requests = server.received_requests().await.unwrap();
    let order: Vec<String> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        order,
        vec![
            "POST /api/v1/trips/trip_001/customize".to_owned(),
            "GET /api/v1/trips/trip_001".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_failed_customize_skips_refetch_and_reports() {
    let (server, planner) = setup().await;
    let mut rx = planner.events();

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/customize"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Unknown alternative" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let swap = build_swap("hotel", "ht_1", "nope", None).unwrap();
    let err = planner.apply("trip_001", &[swap]).await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { status: 400, .. }));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_failure());
    assert!(events[0].to_string().contains("Unknown alternative"));
}

// ── Holds ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hold_derives_stable_key() {
    let (server, planner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .and(body_partial_json(json!({ "hold_ttl_minutes": 30 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "reservation_id": "r1",
            "status": "held",
            "total_amount": 1500,
            "currency": "INR",
            "expires_at": "2025-01-10T12:30:00"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("activity", "quote_123", Some(1500.0), None).unwrap()];
    let first = planner.hold("trip_001", &items, None, None).await.unwrap();
    let second = planner.hold("trip_001", &items, None, None).await.unwrap();

    assert_eq!(first.id(), "r1");
    assert_eq!(first.state, HoldState::Held);
    assert!(first.idempotency_key.as_str().starts_with("booking_trip_001_"));

    // Both submissions carried a key for the same intent. They can only
    // differ if the calls straddled a bucket boundary.
    let requests = server.received_requests().await.unwrap();
    let keys: Vec<serde_json::Value> = requests
        .iter()
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap()["idempotency_key"].clone())
        .collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], json!(first.idempotency_key.as_str()));
    assert_eq!(keys[1], json!(second.idempotency_key.as_str()));
}

#[tokio::test]
async fn test_hold_uses_explicit_key_and_ttl() {
    let (server, planner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .and(body_partial_json(json!({
            "hold_ttl_minutes": 45,
            "idempotency_key": "booking_act42_170000"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "pending_payment"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("activity", "quote_123", None, None).unwrap()];
    let key = IdempotencyKey::new("booking_act42_170000").unwrap();
    let hold = planner
        .hold("trip_001", &items, Some(45), Some(key))
        .await
        .unwrap();
    assert_eq!(hold.state, HoldState::PendingPayment);
    assert!(hold.time_remaining(chrono::Utc::now()).is_none());
}

#[tokio::test]
async fn test_hold_conflict_becomes_reservation_failure() {
    let (server, planner) = setup().await;
    let mut rx = planner.events();

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "detail": "Quote expired" })),
        )
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("hotel", "quote_9", None, None).unwrap()];
    let err = planner.hold("trip_001", &items, None, None).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::ReservationFailed { status: 409, ref detail } if detail == "Quote expired"
    ));
    assert!(drain(&mut rx).iter().all(PlannerEvent::is_failure));
}

#[tokio::test]
async fn test_release_transitions_only_on_acknowledgement() {
    let (server, planner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "held"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/reservations/r1/cancel"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "db down" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/reservations/r1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "message": "Reservation cancelled"
        })))
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("hotel", "quote_9", None, None).unwrap()];
    let mut hold = planner.hold("trip_001", &items, None, None).await.unwrap();
    let mut rx = planner.events();

    assert!(planner.release(&mut hold).await.is_err());
    assert_eq!(hold.state, HoldState::Held);

    let ack = planner.release(&mut hold).await.unwrap();
    assert!(ack.success);
    assert_eq!(hold.state, HoldState::Released);

    let events = drain(&mut rx);
    assert!(events[0].is_failure());
    assert_eq!(
        events[1],
        PlannerEvent::HoldReleased {
            reservation_id: "r1".into()
        }
    );
}

fn sent_keys(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .filter(|r| r.url.path().ends_with("/reserve"))
        .map(|r| {
            serde_json::from_slice::<serde_json::Value>(&r.body).unwrap()["idempotency_key"]
                .as_str()
                .unwrap()
                .to_owned()
        })
        .collect()
}

#[tokio::test]
async fn test_hold_after_release_uses_fresh_key() {
    let (server, planner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "held"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/reservations/r1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "message": "Reservation cancelled"
        })))
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("hotel", "quote_9", None, None).unwrap()];
    let mut first = planner.hold("trip_001", &items, None, None).await.unwrap();
    planner.release(&mut first).await.unwrap();

    // The backend replays the cancelled reservation for the old key and
    // places a new hold for any other key.
    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .and(body_partial_json(json!({ "idempotency_key": first.idempotency_key.as_str() })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "cancelled"
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r2", "status": "held"
        })))
        .mount(&server)
        .await;

    let mut rx = planner.events();
    let second = planner.hold("trip_001", &items, None, None).await.unwrap();

    assert_eq!(second.id(), "r2");
    assert_eq!(second.state, HoldState::Held);
    assert_ne!(second.idempotency_key, first.idempotency_key);

    let keys = sent_keys(&server.received_requests().await.unwrap());
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        PlannerEvent::HoldPlaced { reservation_id, .. } if reservation_id == "r2"
    ));
}

#[tokio::test]
async fn test_replayed_released_reservation_is_not_a_hold() {
    let (server, planner) = setup().await;

    // A hold released by an earlier session: the first key this planner
    // derives maps to the cancelled reservation.
    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "cancelled"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r2", "status": "held"
        })))
        .mount(&server)
        .await;

    let mut rx = planner.events();
    let items = vec![build_reservation_item("hotel", "quote_9", None, None).unwrap()];

    let err = planner.hold("trip_001", &items, None, None).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::HoldNotActive { ref reservation_id, ref state }
            if reservation_id == "r1" && state == "released"
    ));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_failure());

    // The spent key is not reused.
    let hold = planner.hold("trip_001", &items, None, None).await.unwrap();
    assert_eq!(hold.id(), "r2");
    let keys = sent_keys(&server.received_requests().await.unwrap());
    assert_ne!(keys[0], keys[1]);
}

#[tokio::test]
async fn test_explicit_key_replay_of_released_hold_fails() {
    let (server, planner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/trips/trip_001/reserve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "reservation_id": "r1", "status": "expired"
        })))
        .mount(&server)
        .await;

    let items = vec![build_reservation_item("hotel", "quote_9", None, None).unwrap()];
    let key = IdempotencyKey::new("booking_act42_170000").unwrap();
    let err = planner
        .hold("trip_001", &items, None, Some(key))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::HoldNotActive { ref state, .. } if state == "expired"));
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthenticated_planner_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = PlannerConfig::new(Url::parse(&server.uri()).unwrap());
    let planner = Planner::new(&config).unwrap();
    let err = planner.trips(None).await.unwrap_err();
    assert!(matches!(err, CoreError::NotAuthenticated));
}
