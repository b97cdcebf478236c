// Reservation hold endpoints.

use serde::Serialize;
use tracing::debug;

use crate::actions::require;
use crate::client::TripClient;
use crate::error::Error;
use crate::idempotency::IdempotencyKey;
use crate::models::{Acknowledgement, Reservation, ReservationItem};

pub const DEFAULT_HOLD_TTL_MINUTES: u32 = 30;
/// Upper bound the backend accepts for `hold_ttl_minutes` (12 hours).
pub const MAX_HOLD_TTL_MINUTES: u32 = 720;

#[derive(Serialize)]
struct ReserveBody<'a> {
    items: &'a [ReservationItem],
    hold_ttl_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<&'a IdempotencyKey>,
}

impl TripClient {
    /// Place a timed hold on priced items.
    ///
    /// `POST /trips/{id}/reserve`. With an idempotency key, a repeated
    /// submission returns the existing reservation instead of a new one.
    /// Errors carry the server status unchanged (409 when an item can no
    /// longer be held); nothing is compensated locally.
    pub async fn reserve_items(
        &self,
        trip_id: &str,
        items: &[ReservationItem],
        hold_ttl_minutes: u32,
        idempotency_key: Option<&IdempotencyKey>,
    ) -> Result<Reservation, Error> {
        require("trip_id", trip_id)?;
        if items.is_empty() {
            return Err(Error::validation("items", "at least one item is required"));
        }
        for item in items {
            require("provider_quote_id", &item.provider_quote_id)?;
        }
        if !(1..=MAX_HOLD_TTL_MINUTES).contains(&hold_ttl_minutes) {
            return Err(Error::validation(
                "hold_ttl_minutes",
                format!("must be between 1 and {MAX_HOLD_TTL_MINUTES}"),
            ));
        }

        let url = self.endpoint(&["trips", trip_id, "reserve"])?;
        debug!(
            trip_id,
            items = items.len(),
            hold_ttl_minutes,
            idempotent = idempotency_key.is_some(),
            "reserving items"
        );
        let body = ReserveBody {
            items,
            hold_ttl_minutes,
            idempotency_key,
        };
        self.post(url, &body).await
    }

    /// Release a hold. Cancelling an already released or expired hold is
    /// reported the same way as a fresh cancel.
    ///
    /// `POST /reservations/{id}/cancel`
    pub async fn cancel_reservation(&self, reservation_id: &str) -> Result<Acknowledgement, Error> {
        require("reservation_id", reservation_id)?;
        let url = self.endpoint(&["reservations", reservation_id, "cancel"])?;
        debug!(reservation_id, "cancelling reservation");
        self.post_empty(url).await
    }
}
