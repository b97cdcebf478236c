// Idempotency keys for reservation holds.
//
// A key identifies one logical booking intent. Derived keys are a pure
// function of (trip, item set, time bucket): a double submit or a retry
// inside the same window produces the same key, and the server collapses
// the duplicates into one hold.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::require;
use crate::error::Error;
use crate::models::ReservationItem;

/// Name-based UUID namespace for reservation intents.
const INTENT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_9b7d_4c38_a5e2_0d3f_81b6_7c94);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Bucket width used when the caller does not choose one.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(300);

    /// Wrap a caller-supplied key.
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        require("idempotency_key", &raw)?;
        Ok(Self(raw))
    }

    /// Derive the key for reserving `items` on `trip_id` at time `at`.
    ///
    /// Item order does not matter. `window` is clamped to at least one second.
    pub fn derive(
        trip_id: &str,
        items: &[ReservationItem],
        at: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        Self::derive_generation(trip_id, items, at, window, 0)
    }

    /// Like [`derive`](Self::derive), for the `generation`-th intent over
    /// the same items. Generation 0 is the plain derived key; a later one
    /// is used once an earlier intent's reservation has been released.
    pub fn derive_generation(
        trip_id: &str,
        items: &[ReservationItem],
        at: DateTime<Utc>,
        window: Duration,
        generation: u32,
    ) -> Self {
        let mut lines: Vec<String> = items
            .iter()
            .map(|item| {
                let amount = item
                    .amount
                    .map_or_else(|| "-".to_owned(), |a| format!("{a:.2}"));
                format!(
                    "{}|{}|{}|{}",
                    item.item_type, item.provider_quote_id, amount, item.currency
                )
            })
            .collect();
        lines.sort_unstable();

        let mut intent = format!("{trip_id}\n{}", lines.join("\n"));
        if generation > 0 {
            intent.push_str(&format!("\n#{generation}"));
        }
        let digest = Uuid::new_v5(&INTENT_NAMESPACE, intent.as_bytes());

        let width = i64::try_from(window.as_secs()).unwrap_or(i64::MAX).max(1);
        let bucket = at.timestamp().div_euclid(width);

        Self(format!("booking_{trip_id}_{}_{bucket}", digest.simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::actions::build_reservation_item;

    fn items() -> Vec<ReservationItem> {
        vec![
            build_reservation_item("activity", "quote_123", Some(1500.0), None).unwrap(),
            build_reservation_item("hotel", "quote_456", None, None).unwrap(),
        ]
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn same_intent_same_key() {
        let window = IdempotencyKey::DEFAULT_WINDOW;
        let a = IdempotencyKey::derive("trip_001", &items(), at(1_700_000_010), window);
        let b = IdempotencyKey::derive("trip_001", &items(), at(1_700_000_090), window);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("booking_trip_001_"));
    }

    #[test]
    fn item_order_is_irrelevant() {
        let mut reversed = items();
        reversed.reverse();
        let t = at(1_700_000_000);
        assert_eq!(
            IdempotencyKey::derive("trip_001", &items(), t, IdempotencyKey::DEFAULT_WINDOW),
            IdempotencyKey::derive("trip_001", &reversed, t, IdempotencyKey::DEFAULT_WINDOW),
        );
    }

    #[test]
    fn different_intent_or_bucket_changes_key() {
        let window = Duration::from_secs(60);
        let t = at(1_700_000_000);
        let base = IdempotencyKey::derive("trip_001", &items(), t, window);

        assert_ne!(base, IdempotencyKey::derive("trip_002", &items(), t, window));
        assert_ne!(base, IdempotencyKey::derive("trip_001", &items()[..1], t, window));
        assert_ne!(
            base,
            IdempotencyKey::derive("trip_001", &items(), at(1_700_000_000 + 60), window)
        );
    }

    #[test]
    fn later_generation_gets_fresh_key() {
        let window = IdempotencyKey::DEFAULT_WINDOW;
        let t = at(1_700_000_000);
        let first = IdempotencyKey::derive("trip_001", &items(), t, window);
        assert_eq!(
            first,
            IdempotencyKey::derive_generation("trip_001", &items(), t, window, 0)
        );

        let next = IdempotencyKey::derive_generation("trip_001", &items(), t, window, 1);
        assert_ne!(first, next);
        assert!(next.as_str().starts_with("booking_trip_001_"));
        assert!(next.as_str().ends_with(&format!("_{}", 1_700_000_000 / 300)));
    }

    #[test]
    fn zero_window_is_clamped() {
        let key = IdempotencyKey::derive("t", &items(), at(42), Duration::ZERO);
        assert!(key.as_str().ends_with("_42"));
    }

    #[test]
    fn explicit_keys_must_be_non_empty() {
        assert!(IdempotencyKey::new("").is_err());
        let key = IdempotencyKey::new("booking_act42_170000").unwrap();
        assert_eq!(key.to_string(), "booking_act42_170000");
    }
}
