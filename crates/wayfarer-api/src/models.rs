// Wire types for the trip planning API.
//
// Response documents are progressively enriched server-side (the planner
// fills in days, booking options and weather over time), so fields use
// `#[serde(default)]` liberally and unknown keys are kept in `extra`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Item type ────────────────────────────────────────────────────────

/// Kind of itinerary item an action or reservation refers to.
///
/// Open set: values the client does not know round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    Flight,
    Hotel,
    Activity,
    Restaurant,
    Transport,
    Other(String),
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Activity => "activity",
            Self::Restaurant => "restaurant",
            Self::Transport => "transport",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ItemType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "flight" => Self::Flight,
            "hotel" => Self::Hotel,
            "activity" => Self::Activity,
            "restaurant" => Self::Restaurant,
            "transport" => Self::Transport,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ItemType {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<ItemType> for String {
    fn from(t: ItemType) -> Self {
        match t {
            ItemType::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Trips ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Draft,
    Pending,
    Confirmed,
    Booked,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TripStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Itinerary document as returned by `GET /trips` and `GET /trips/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub input: TripInput,
    #[serde(default)]
    pub summary: TripSummary,
    /// Reservation ids currently attached to the itinerary.
    #[serde(default)]
    pub reservations: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Trip {
    /// Display title, falling back to "Trip to {destination}".
    pub fn title(&self) -> String {
        match &self.summary.title {
            Some(t) if !t.is_empty() => t.clone(),
            _ => format!("Trip to {}", self.input.destination),
        }
    }

    pub fn destination(&self) -> &str {
        &self.input.destination
    }

    pub fn travelers(&self) -> u32 {
        self.input.travelers.unwrap_or(1)
    }

    /// All items across all days, in itinerary order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.summary.days.iter().flat_map(|d| d.activities.iter())
    }

    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items().find(|i| i.id == item_id)
    }
}

/// What the traveler asked for when the trip was created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripInput {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub budget_in_inr: Option<f64>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub travelers: Option<u32>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub center: Option<GeoPoint>,
    #[serde(default)]
    pub days: Vec<DayPlan>,
    /// Budget summary by category (free-form, server-computed).
    #[serde(default)]
    pub cost_breakdown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub activities: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Booked,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        })
    }
}

/// One activity, hotel night, flight, etc. inside a day plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Price of the item, whichever field the planner filled in. A booked
    /// cost wins over an estimate.
    pub fn price(&self) -> Option<f64> {
        self.cost.or(self.amount).or(self.estimated_cost)
    }
}

/// Body of `POST /trips/create`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTripRequest {
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_in_inr: Option<f64>,
    pub themes: Vec<String>,
    pub travelers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTrip {
    #[serde(default)]
    pub success: bool,
    pub itinerary_id: String,
}

/// Response of `POST /trips/{id}/customize`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomizeOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Present only if the server chooses to echo the result; callers
    /// should re-fetch rather than rely on it.
    #[serde(default, rename = "updatedTrip", alias = "updated_trip")]
    pub updated_trip: Option<Trip>,
}

// ── Alternatives ─────────────────────────────────────────────────────

/// Filters for `POST /trips/{id}/alternatives`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlternativeConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub price_total: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Alternative {
    /// Quoted price, whichever field the provider used.
    pub fn price(&self) -> Option<f64> {
        self.price_total
            .or(self.total_price)
            .or(self.amount)
            .or(self.estimated_cost)
    }
}

// ── Reservations ─────────────────────────────────────────────────────

/// A priced, provider-identified unit to be held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub provider_quote_id: String,
    /// `None` lets the server resolve the price from the trip's quotes.
    pub amount: Option<f64>,
    pub currency: String,
}

/// Server response to `POST /trips/{id}/reserve`.
///
/// An idempotent replay only carries `reservation_id` and `status`, so the
/// remaining fields are optional. Values are kept exactly as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default)]
    pub success: bool,
    pub reservation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<HeldItem>,
}

impl Reservation {
    /// Parse `expires_at`. The backend emits naive UTC ISO-8601 timestamps;
    /// RFC 3339 with an offset is also accepted.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.as_deref().and_then(parse_timestamp)
    }
}

/// One line of a reservation as resolved by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub provider_quote_id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_hold_id: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Weather ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weather {
    #[serde(default)]
    pub fetched_at: Option<String>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date (`YYYY-MM-DD`).
    #[serde(default)]
    pub dt: String,
    #[serde(default)]
    pub temp: Option<Temperature>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    /// Probability of precipitation, 0..=1.
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Temperature {
    #[serde(default)]
    pub day: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub night: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

// ── Hidden gems ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HiddenGem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Query for `GET /trips/{id}/hidden_gems`.
#[derive(Debug, Clone)]
pub struct GemQuery {
    /// Topics such as `cafe`, `waterfall`, `heritage`; sent comma-joined.
    pub topics: Vec<String>,
    /// Search radius in metres. Zero omits the parameter.
    pub radius_m: u32,
}

impl GemQuery {
    pub const DEFAULT_RADIUS_M: u32 = 5000;

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let topics: Vec<&str> = self
            .topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !topics.is_empty() {
            params.push(("filter", topics.join(",")));
        }
        if self.radius_m > 0 {
            params.push(("radius_m", self.radius_m.to_string()));
        }
        params
    }
}

impl Default for GemQuery {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            radius_m: Self::DEFAULT_RADIUS_M,
        }
    }
}

// ── Bookings & payments ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    #[serde(default)]
    pub itinerary_id: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub provider_refs: Vec<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `POST /trips/{id}/book`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedBooking {
    #[serde(default)]
    pub success: bool,
    pub booking_id: String,
    pub status: BookingStatus,
}

/// Body of `POST /payments/checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub reservation_id: String,
    pub amount: f64,
    pub currency: String,
}

// ── Envelopes ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct TripsEnvelope {
    #[serde(default)]
    pub trips: Vec<Trip>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TripEnvelope {
    pub itinerary: Trip,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlternativesEnvelope {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherEnvelope {
    pub weather: Weather,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GemsEnvelope {
    #[serde(default)]
    pub gems: Vec<HiddenGem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookingsEnvelope {
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookingEnvelope {
    pub booking: Booking,
}

// ── Timestamps ───────────────────────────────────────────────────────

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}
