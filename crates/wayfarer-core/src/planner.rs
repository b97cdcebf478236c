// ── Planner facade ──
//
// The service layer consumers talk to. Wraps one `TripClient`, applies
// configured defaults, re-fetches after writes and publishes an event for
// every outcome. Nothing is retried and no local state is patched.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wayfarer_api::models::{
    Acknowledgement, Alternative, AlternativeConstraints, Booking, CreateTripRequest,
    CreatedTrip, FinalizedBooking, GemQuery, HiddenGem, ItemType, ReservationItem, Trip,
    TripStatus, Weather,
};
use wayfarer_api::{
    Action, Checkout, IdempotencyKey, NoToken, StaticToken, TlsMode, TokenProvider, TransportConfig,
    TripClient,
};

use crate::config::{PlannerConfig, TlsVerification};
use crate::error::CoreError;
use crate::events::{EventBus, PlannerEvent};
use crate::hold::Hold;

/// Defaults applied by the Planner when a caller leaves them out.
#[derive(Debug, Clone)]
struct Defaults {
    currency: String,
    hold_ttl_minutes: u32,
    idempotency_window: std::time::Duration,
}

/// Derived idempotency keys this planner has used, so a released intent
/// is never replayed by a later hold on the same items.
#[derive(Debug, Default)]
struct IntentLedger {
    /// Reservation id -> derived key, for holds placed by this planner.
    placed: HashMap<String, IdempotencyKey>,
    /// Keys whose reservation is released or otherwise spent.
    retired: HashSet<IdempotencyKey>,
}

/// Entry point for consumers. Cheap to clone; clones share the client,
/// the event bus and the intent ledger.
#[derive(Debug, Clone)]
pub struct Planner {
    client: TripClient,
    defaults: Arc<Defaults>,
    events: EventBus,
    intents: Arc<Mutex<IntentLedger>>,
}

impl Planner {
    /// Build a planner with its own HTTP client from `config`.
    pub fn new(config: &PlannerConfig) -> Result<Self, CoreError> {
        let tls = match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig::default()
            .with_tls(tls)
            .with_timeout(config.timeout);
        let tokens: Arc<dyn TokenProvider> = match &config.token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(NoToken),
        };
        let client = TripClient::new(config.api_url.as_str(), tokens, &transport)?;
        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing client (custom token provider, shared transport).
    pub fn with_client(client: TripClient, config: &PlannerConfig) -> Self {
        Self {
            client,
            defaults: Arc::new(Defaults {
                currency: config.currency.clone(),
                hold_ttl_minutes: config.hold_ttl_minutes,
                idempotency_window: config.idempotency_window,
            }),
            events: EventBus::new(),
            intents: Arc::default(),
        }
    }

    pub fn client(&self) -> &TripClient {
        &self.client
    }

    /// Subscribe to operation outcomes.
    pub fn events(&self) -> broadcast::Receiver<Arc<PlannerEvent>> {
        self.events.subscribe()
    }

    pub fn default_currency(&self) -> &str {
        &self.defaults.currency
    }

    fn intents(&self) -> MutexGuard<'_, IntentLedger> {
        self.intents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// First derived key for this intent that no released hold has used.
    fn derive_key(&self, trip_id: &str, items: &[ReservationItem]) -> IdempotencyKey {
        let now = Utc::now();
        let window = self.defaults.idempotency_window;
        let ledger = self.intents();
        let mut generation = 0;
        loop {
            let key = IdempotencyKey::derive_generation(trip_id, items, now, window, generation);
            if !ledger.retired.contains(&key) || generation == u32::MAX {
                return key;
            }
            generation += 1;
        }
    }

    // ── Failure reporting ────────────────────────────────────────────

    fn failed(&self, operation: &'static str, err: CoreError) -> CoreError {
        warn!(operation, error = %err, "operation failed");
        self.events.publish(PlannerEvent::OperationFailed {
            operation,
            message: err.to_string(),
        });
        err
    }

    async fn run<T: Send>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, wayfarer_api::Error>> + Send,
    ) -> Result<T, CoreError> {
        call.await
            .map_err(|e| self.failed(operation, CoreError::from(e)))
    }

    // ── Trips ────────────────────────────────────────────────────────

    pub async fn trips(&self, status: Option<TripStatus>) -> Result<Vec<Trip>, CoreError> {
        self.run("list trips", self.client.list_trips(status)).await
    }

    pub async fn trip(&self, trip_id: &str) -> Result<Trip, CoreError> {
        self.run("get trip", self.client.get_trip(trip_id)).await
    }

    pub async fn create_trip(&self, request: &CreateTripRequest) -> Result<CreatedTrip, CoreError> {
        let created = self
            .run("create trip", self.client.create_trip(request))
            .await?;
        info!(trip_id = %created.itinerary_id, "trip created");
        self.events.publish(PlannerEvent::TripCreated {
            trip_id: created.itinerary_id.clone(),
        });
        Ok(created)
    }

    /// Submit `actions` as one batch, then return the re-fetched trip.
    ///
    /// The echoed `updatedTrip`, if any, is ignored in favour of a fresh read.
    pub async fn apply(&self, trip_id: &str, actions: &[Action]) -> Result<Trip, CoreError> {
        let outcome = self
            .run("customize trip", self.client.customize_trip(trip_id, actions))
            .await?;
        debug!(trip_id, message = ?outcome.message, "customization accepted");

        let trip = self.run("get trip", self.client.get_trip(trip_id)).await?;
        self.events.publish(PlannerEvent::TripUpdated {
            trip_id: trip_id.to_owned(),
            actions: actions.len(),
        });
        Ok(trip)
    }

    pub async fn alternatives(
        &self,
        trip_id: &str,
        item_type: &ItemType,
        current_id: &str,
        constraints: Option<&AlternativeConstraints>,
    ) -> Result<Vec<Alternative>, CoreError> {
        self.run(
            "get alternatives",
            self.client
                .get_alternatives(trip_id, item_type, current_id, constraints),
        )
        .await
    }

    pub async fn weather(&self, trip_id: &str) -> Result<Weather, CoreError> {
        self.run("get weather", self.client.get_trip_weather(trip_id))
            .await
    }

    pub async fn hidden_gems(
        &self,
        trip_id: &str,
        query: &GemQuery,
    ) -> Result<Vec<HiddenGem>, CoreError> {
        self.run("get hidden gems", self.client.get_hidden_gems(trip_id, query))
            .await
    }

    // ── Holds ────────────────────────────────────────────────────────

    /// Place a hold on `items`.
    ///
    /// Without an explicit key one is derived from the trip, the item set
    /// and the current time bucket, so a resubmission within the window
    /// collapses server-side into the same reservation. Once that
    /// reservation is released the next hold derives a fresh key.
    ///
    /// A reserve answered with a released, expired or paid reservation is
    /// a replay of a spent intent and fails with `HoldNotActive`.
    pub async fn hold(
        &self,
        trip_id: &str,
        items: &[ReservationItem],
        ttl_minutes: Option<u32>,
        key: Option<IdempotencyKey>,
    ) -> Result<Hold, CoreError> {
        let ttl = ttl_minutes.unwrap_or(self.defaults.hold_ttl_minutes);
        let (key, derived) = match key {
            Some(key) => (key, false),
            None => (self.derive_key(trip_id, items), true),
        };

        let reservation = self
            .client
            .reserve_items(trip_id, items, ttl, Some(&key))
            .await
            .map_err(|e| self.failed("reserve items", CoreError::from_reservation(e)))?;

        let hold = Hold::new(trip_id.to_owned(), key, reservation);
        if hold.state.is_settled() {
            if derived {
                self.intents().retired.insert(hold.idempotency_key.clone());
            }
            return Err(self.failed(
                "reserve items",
                CoreError::HoldNotActive {
                    reservation_id: hold.id().to_owned(),
                    state: hold.state.to_string(),
                },
            ));
        }
        if derived {
            self.intents()
                .placed
                .insert(hold.id().to_owned(), hold.idempotency_key.clone());
        }

        info!(trip_id, reservation_id = hold.id(), state = %hold.state, "hold placed");
        self.events.publish(PlannerEvent::HoldPlaced {
            trip_id: trip_id.to_owned(),
            reservation_id: hold.id().to_owned(),
            expires_at: hold.reservation.expires_at.clone(),
        });
        Ok(hold)
    }

    /// Release `hold`. Its state moves to `Released` only when the server
    /// acknowledges the cancel.
    pub async fn release(&self, hold: &mut Hold) -> Result<Acknowledgement, CoreError> {
        let ack = self.release_id(hold.id()).await?;
        if ack.success {
            hold.mark_released();
        }
        Ok(ack)
    }

    /// Release a hold known only by id.
    pub async fn release_id(&self, reservation_id: &str) -> Result<Acknowledgement, CoreError> {
        let ack = self
            .run(
                "cancel reservation",
                self.client.cancel_reservation(reservation_id),
            )
            .await?;
        if ack.success {
            {
                let mut ledger = self.intents();
                if let Some(key) = ledger.placed.remove(reservation_id) {
                    ledger.retired.insert(key);
                }
            }
            self.events.publish(PlannerEvent::HoldReleased {
                reservation_id: reservation_id.to_owned(),
            });
        } else {
            debug!(reservation_id, message = ?ack.message, "cancel not acknowledged");
        }
        Ok(ack)
    }

    // ── Bookings & payments ──────────────────────────────────────────

    pub async fn bookings(&self) -> Result<Vec<Booking>, CoreError> {
        self.run("list bookings", self.client.list_bookings()).await
    }

    pub async fn booking(&self, booking_id: &str) -> Result<Booking, CoreError> {
        self.run("get booking", self.client.get_booking(booking_id))
            .await
    }

    pub async fn cancel_booking(&self, booking_id: &str) -> Result<Acknowledgement, CoreError> {
        let ack = self
            .run("cancel booking", self.client.cancel_booking(booking_id))
            .await?;
        if ack.success {
            self.events.publish(PlannerEvent::BookingCancelled {
                booking_id: booking_id.to_owned(),
            });
        }
        Ok(ack)
    }

    pub async fn finalize_booking(
        &self,
        trip_id: &str,
        reservation_id: &str,
        payment_id: &str,
    ) -> Result<FinalizedBooking, CoreError> {
        let booked = self
            .run(
                "finalize booking",
                self.client
                    .finalize_booking(trip_id, reservation_id, payment_id),
            )
            .await?;
        self.events.publish(PlannerEvent::BookingConfirmed {
            trip_id: trip_id.to_owned(),
            booking_id: booked.booking_id.clone(),
        });
        Ok(booked)
    }

    /// Start a payment for a held reservation. `currency` falls back to the
    /// configured default.
    pub async fn checkout(
        &self,
        reservation_id: &str,
        amount: f64,
        currency: Option<&str>,
    ) -> Result<Checkout, CoreError> {
        let currency = currency.unwrap_or(&self.defaults.currency);
        self.run(
            "checkout",
            self.client.checkout(reservation_id, amount, Some(currency)),
        )
        .await
    }
}
