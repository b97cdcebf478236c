// ── Reservation holds ──
//
// A `Hold` wraps the server's reservation response with the key that
// produced it and a state derived from the server's status string. State
// changes only when a server response says so; local time is used for
// display and never moves a hold to `Expired`.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use wayfarer_api::IdempotencyKey;
use wayfarer_api::models::Reservation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldState {
    Held,
    PendingPayment,
    Paid,
    Booked,
    Released,
    Expired,
    /// A status string this client does not recognize, kept verbatim.
    Unknown(String),
}

impl HoldState {
    /// Map a server status. A successful reserve that omits the status is a
    /// plain hold.
    pub fn from_status(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return Self::Held;
        };
        match status.to_ascii_lowercase().as_str() {
            "held" | "hold" => Self::Held,
            "pending_payment" => Self::PendingPayment,
            "paid" => Self::Paid,
            "booked" | "confirmed" => Self::Booked,
            "released" | "cancelled" | "canceled" => Self::Released,
            "expired" => Self::Expired,
            _ => Self::Unknown(status.to_owned()),
        }
    }

    /// Whether the hold still reserves inventory and can be released.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Held | Self::PendingPayment)
    }

    /// Whether a reserve answered in this state placed no new hold: the
    /// reservation behind it was already released, expired or paid for.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Released | Self::Expired | Self::Paid | Self::Booked
        )
    }
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Held => f.write_str("held"),
            Self::PendingPayment => f.write_str("pending_payment"),
            Self::Paid => f.write_str("paid"),
            Self::Booked => f.write_str("booked"),
            Self::Released => f.write_str("released"),
            Self::Expired => f.write_str("expired"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

/// A reservation placed through the Planner.
#[derive(Debug, Clone, Serialize)]
pub struct Hold {
    pub trip_id: String,
    pub idempotency_key: IdempotencyKey,
    pub state: HoldState,
    pub reservation: Reservation,
}

impl Hold {
    pub fn new(trip_id: String, idempotency_key: IdempotencyKey, reservation: Reservation) -> Self {
        let state = HoldState::from_status(reservation.status.as_deref());
        Self {
            trip_id,
            idempotency_key,
            state,
            reservation,
        }
    }

    pub fn id(&self) -> &str {
        &self.reservation.reservation_id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.reservation.expires_at_utc()
    }

    /// Time left before the server's expiry, clamped at zero.
    ///
    /// Display only. `None` when the server sent no parseable expiry.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at()
            .map(|expiry| (expiry - now).max(TimeDelta::zero()))
    }

    pub(crate) fn mark_released(&mut self) {
        self.state = HoldState::Released;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn reservation(status: Option<&str>, expires_at: Option<&str>) -> Reservation {
        Reservation {
            success: true,
            reservation_id: "r1".into(),
            status: status.map(str::to_owned),
            expires_at: expires_at.map(str::to_owned),
            total_amount: Some(1500.0),
            currency: Some("INR".into()),
            items: Vec::new(),
        }
    }

    fn key() -> IdempotencyKey {
        IdempotencyKey::new("booking_trip_001_x_1").unwrap()
    }

    #[test]
    fn state_follows_server_status() {
        assert_eq!(HoldState::from_status(None), HoldState::Held);
        assert_eq!(HoldState::from_status(Some("held")), HoldState::Held);
        assert_eq!(
            HoldState::from_status(Some("pending_payment")),
            HoldState::PendingPayment
        );
        assert_eq!(HoldState::from_status(Some("cancelled")), HoldState::Released);
        assert_eq!(
            HoldState::from_status(Some("on_request")),
            HoldState::Unknown("on_request".into())
        );
        assert!(HoldState::PendingPayment.is_active());
        assert!(!HoldState::Paid.is_active());
        assert!(HoldState::Released.is_settled());
        assert!(HoldState::Booked.is_settled());
        assert!(!HoldState::Held.is_settled());
        assert!(!HoldState::Unknown("on_request".into()).is_settled());
    }

    #[test]
    fn time_remaining_is_display_only() {
        let hold = Hold::new(
            "trip_001".into(),
            key(),
            reservation(Some("held"), Some("2025-01-10T12:30:00")),
        );
        let before = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(hold.time_remaining(before), Some(TimeDelta::minutes(30)));

        let after = Utc.with_ymd_and_hms(2025, 1, 10, 13, 0, 0).unwrap();
        assert_eq!(hold.time_remaining(after), Some(TimeDelta::zero()));
        // Past expiry locally, still whatever the server said.
        assert_eq!(hold.state, HoldState::Held);
    }

    #[test]
    fn missing_expiry_has_no_countdown() {
        let hold = Hold::new("trip_001".into(), key(), reservation(None, None));
        assert_eq!(hold.id(), "r1");
        assert!(hold.time_remaining(Utc::now()).is_none());
    }
}
