// wayfarer-core: Planner facade between wayfarer-api and consumers (CLI).

pub mod config;
pub mod error;
pub mod events;
pub mod hold;
pub mod planner;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PlannerConfig, TlsVerification};
pub use error::CoreError;
pub use events::{EventBus, PlannerEvent};
pub use hold::{Hold, HoldState};
pub use planner::Planner;

// Builders and wire types consumers need alongside the Planner.
pub use wayfarer_api::models;
pub use wayfarer_api::{
    Action, Checkout, IdempotencyKey, build_add, build_remove, build_reservation_item, build_swap,
};
