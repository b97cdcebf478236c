// Action and reservation-item builders.
//
// Pure constructors: no I/O, no clock. They are the only place request
// well-formedness is enforced, so anything reaching the wire has every
// required identifier present.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{ItemType, ReservationItem};

pub const DEFAULT_CURRENCY: &str = "INR";

/// One itinerary edit. Serialized as `{"op": "swap" | "add" | "remove", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Replace `item_id` with `alternative_id`.
    Swap {
        item_type: ItemType,
        item_id: String,
        alternative_id: String,
        reason: Option<String>,
    },
    /// Add `alternative_id` to the itinerary.
    Add {
        item_type: ItemType,
        alternative_id: String,
        reason: Option<String>,
    },
    /// Drop `item_id` from the itinerary.
    Remove {
        item_type: ItemType,
        item_id: String,
        reason: Option<String>,
    },
}

impl Action {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Swap { .. } => "swap",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
        }
    }

    pub fn item_type(&self) -> &ItemType {
        match self {
            Self::Swap { item_type, .. }
            | Self::Add { item_type, .. }
            | Self::Remove { item_type, .. } => item_type,
        }
    }

    /// Re-check an action that did not come through a builder
    /// (e.g. deserialized from a file).
    pub fn validate(&self) -> Result<(), Error> {
        require_type(self.item_type())?;
        match self {
            Self::Swap {
                item_id,
                alternative_id,
                ..
            } => {
                require("item_id", item_id)?;
                require("alternative_id", alternative_id)
            }
            Self::Add { alternative_id, .. } => require("alternative_id", alternative_id),
            Self::Remove { item_id, .. } => require("item_id", item_id),
        }
    }
}

/// Validate an ordered batch before it is sent as one request.
///
/// An empty batch is rejected: it would be a request with no effect.
pub fn validate_batch(actions: &[Action]) -> Result<(), Error> {
    if actions.is_empty() {
        return Err(Error::validation("actions", "batch must contain at least one action"));
    }
    actions.iter().try_for_each(Action::validate)
}

pub fn build_swap(
    item_type: impl Into<ItemType>,
    item_id: &str,
    alternative_id: &str,
    reason: Option<&str>,
) -> Result<Action, Error> {
    let item_type = item_type.into();
    require_type(&item_type)?;
    require("item_id", item_id)?;
    require("alternative_id", alternative_id)?;
    Ok(Action::Swap {
        item_type,
        item_id: item_id.to_owned(),
        alternative_id: alternative_id.to_owned(),
        reason: normalize_reason(reason),
    })
}

pub fn build_add(
    item_type: impl Into<ItemType>,
    alternative_id: &str,
    reason: Option<&str>,
) -> Result<Action, Error> {
    let item_type = item_type.into();
    require_type(&item_type)?;
    require("alternative_id", alternative_id)?;
    Ok(Action::Add {
        item_type,
        alternative_id: alternative_id.to_owned(),
        reason: normalize_reason(reason),
    })
}

pub fn build_remove(
    item_type: impl Into<ItemType>,
    item_id: &str,
    reason: Option<&str>,
) -> Result<Action, Error> {
    let item_type = item_type.into();
    require_type(&item_type)?;
    require("item_id", item_id)?;
    Ok(Action::Remove {
        item_type,
        item_id: item_id.to_owned(),
        reason: normalize_reason(reason),
    })
}

/// Build a reservation line. `currency` defaults to INR.
pub fn build_reservation_item(
    item_type: impl Into<ItemType>,
    provider_quote_id: &str,
    amount: Option<f64>,
    currency: Option<&str>,
) -> Result<ReservationItem, Error> {
    let item_type = item_type.into();
    require_type(&item_type)?;
    require("provider_quote_id", provider_quote_id)?;
    if let Some(amount) = amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::validation(
                "amount",
                format!("must be a non-negative number, got {amount}"),
            ));
        }
    }
    let currency = currency.unwrap_or(DEFAULT_CURRENCY).trim();
    require("currency", currency)?;
    Ok(ReservationItem {
        item_type,
        provider_quote_id: provider_quote_id.to_owned(),
        amount,
        currency: currency.to_ascii_uppercase(),
    })
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_type(item_type: &ItemType) -> Result<(), Error> {
    require("item_type", item_type.as_str())
}

fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
}
