// ── Planner notifications ──
//
// Outcomes of Planner operations, published on a broadcast channel.
// Subscribers that fall behind lose the oldest events; publishing never
// blocks and succeeds with zero subscribers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlannerEvent {
    TripCreated {
        trip_id: String,
    },
    /// A customization batch was accepted and the trip re-fetched.
    TripUpdated {
        trip_id: String,
        actions: usize,
    },
    HoldPlaced {
        trip_id: String,
        reservation_id: String,
        expires_at: Option<String>,
    },
    HoldReleased {
        reservation_id: String,
    },
    BookingConfirmed {
        trip_id: String,
        booking_id: String,
    },
    BookingCancelled {
        booking_id: String,
    },
    OperationFailed {
        operation: &'static str,
        message: String,
    },
}

impl PlannerEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::OperationFailed { .. })
    }
}

impl fmt::Display for PlannerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TripCreated { trip_id } => write!(f, "trip {trip_id} created"),
            Self::TripUpdated { trip_id, actions } => {
                write!(f, "trip {trip_id} updated ({actions} action(s) applied)")
            }
            Self::HoldPlaced {
                reservation_id,
                expires_at: Some(expiry),
                ..
            } => write!(f, "hold {reservation_id} placed, expires {expiry}"),
            Self::HoldPlaced { reservation_id, .. } => write!(f, "hold {reservation_id} placed"),
            Self::HoldReleased { reservation_id } => write!(f, "hold {reservation_id} released"),
            Self::BookingConfirmed { booking_id, .. } => {
                write!(f, "booking {booking_id} confirmed")
            }
            Self::BookingCancelled { booking_id } => write!(f, "booking {booking_id} cancelled"),
            Self::OperationFailed { operation, message } => {
                write!(f, "{operation} failed: {message}")
            }
        }
    }
}

/// Broadcast bus for [`PlannerEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Arc<PlannerEvent>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn publish(&self, event: PlannerEvent) {
        // No receivers is fine.
        let _ = self.tx.send(Arc::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PlannerEvent>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(PlannerEvent::HoldReleased {
            reservation_id: "r1".into(),
        });
    }

    #[test]
    fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(PlannerEvent::TripCreated {
            trip_id: "it_1".into(),
        });
        bus.publish(PlannerEvent::OperationFailed {
            operation: "hold",
            message: "Conflict".into(),
        });

        let first = rx.try_recv().unwrap();
        assert_eq!(first.to_string(), "trip it_1 created");
        let second = rx.try_recv().unwrap();
        assert!(second.is_failure());
        assert_eq!(second.to_string(), "hold failed: Conflict");
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = PlannerEvent::HoldPlaced {
            trip_id: "trip_001".into(),
            reservation_id: "r1".into(),
            expires_at: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "hold_placed");
        assert_eq!(value["reservation_id"], "r1");
    }
}
