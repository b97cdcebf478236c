// wayfarer-api: Async Rust client for the Wayfarer trip planning API
//
// Trips, batch customization, reservation holds, bookings and payments.
// Every operation is one stateless request; authoritative state stays
// server-side.

pub mod actions;
pub mod auth;
pub mod bookings;
pub mod client;
pub mod error;
pub mod idempotency;
pub mod models;
pub mod reservations;
pub mod transport;
pub mod trips;

pub use actions::{
    Action, DEFAULT_CURRENCY, build_add, build_remove, build_reservation_item, build_swap,
    validate_batch,
};
pub use auth::{NoToken, SessionToken, StaticToken, TokenProvider};
pub use bookings::Checkout;
pub use client::TripClient;
pub use error::Error;
pub use idempotency::IdempotencyKey;
pub use reservations::{DEFAULT_HOLD_TTL_MINUTES, MAX_HOLD_TTL_MINUTES};
pub use transport::{TlsMode, TransportConfig};
