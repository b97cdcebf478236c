// Trip endpoints: reads, creation and customization.
//
// Reads are stateless and uncached. `customize_trip` sends the whole batch
// in one request; a non-2xx response means no action was applied.

use serde::Serialize;
use tracing::debug;

use crate::actions::{Action, require, validate_batch};
use crate::client::TripClient;
use crate::error::Error;
use crate::models::{
    Alternative, AlternativeConstraints, AlternativesEnvelope, CreateTripRequest, CreatedTrip,
    CustomizeOutcome, GemQuery, GemsEnvelope, HiddenGem, ItemType, Trip, TripEnvelope,
    TripStatus, TripsEnvelope, Weather, WeatherEnvelope,
};

pub const MAX_TRAVELERS: u32 = 20;
pub const MAX_DURATION_DAYS: u32 = 60;

#[derive(Serialize)]
struct CustomizeBody<'a> {
    actions: &'a [Action],
}

#[derive(Serialize)]
struct AlternativesBody<'a> {
    item_type: &'a ItemType,
    current_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<&'a AlternativeConstraints>,
}

impl TripClient {
    /// List the caller's trips, optionally filtered by status.
    ///
    /// `GET /trips?status=`
    pub async fn list_trips(&self, status: Option<TripStatus>) -> Result<Vec<Trip>, Error> {
        let url = self.endpoint(&["trips"])?;
        let params: Vec<(&str, String)> = status
            .map(|s| ("status", s.as_str().to_owned()))
            .into_iter()
            .collect();
        let envelope: TripsEnvelope = self.get_with_params(url, &params).await?;
        Ok(envelope.trips)
    }

    /// `GET /trips/{id}`
    pub async fn get_trip(&self, trip_id: &str) -> Result<Trip, Error> {
        require("trip_id", trip_id)?;
        let url = self.endpoint(&["trips", trip_id])?;
        let envelope: TripEnvelope = self.get(url).await?;
        Ok(envelope.itinerary)
    }

    /// Ask the planner to generate a new itinerary.
    ///
    /// `POST /trips/create`
    pub async fn create_trip(&self, request: &CreateTripRequest) -> Result<CreatedTrip, Error> {
        validate_create(request)?;
        let url = self.endpoint(&["trips", "create"])?;
        debug!(destination = %request.destination, "creating trip");
        self.post(url, request).await
    }

    /// Submit an ordered batch of actions. The server applies all or none.
    ///
    /// `POST /trips/{id}/customize`
    pub async fn customize_trip(
        &self,
        trip_id: &str,
        actions: &[Action],
    ) -> Result<CustomizeOutcome, Error> {
        require("trip_id", trip_id)?;
        validate_batch(actions)?;
        let url = self.endpoint(&["trips", trip_id, "customize"])?;
        debug!(trip_id, count = actions.len(), "customizing trip");
        self.post(url, &CustomizeBody { actions }).await
    }

    /// Candidate replacements for one itinerary item.
    ///
    /// `POST /trips/{id}/alternatives`
    pub async fn get_alternatives(
        &self,
        trip_id: &str,
        item_type: &ItemType,
        current_id: &str,
        constraints: Option<&AlternativeConstraints>,
    ) -> Result<Vec<Alternative>, Error> {
        require("trip_id", trip_id)?;
        require("item_type", item_type.as_str())?;
        require("current_id", current_id)?;
        let url = self.endpoint(&["trips", trip_id, "alternatives"])?;
        let body = AlternativesBody {
            item_type,
            current_id,
            constraints,
        };
        let envelope: AlternativesEnvelope = self.post(url, &body).await?;
        Ok(envelope.alternatives)
    }

    /// `GET /trips/{id}/weather`
    pub async fn get_trip_weather(&self, trip_id: &str) -> Result<Weather, Error> {
        require("trip_id", trip_id)?;
        let url = self.endpoint(&["trips", trip_id, "weather"])?;
        let envelope: WeatherEnvelope = self.get(url).await?;
        Ok(envelope.weather)
    }

    /// `GET /trips/{id}/hidden_gems?filter=&radius_m=`
    pub async fn get_hidden_gems(
        &self,
        trip_id: &str,
        query: &GemQuery,
    ) -> Result<Vec<HiddenGem>, Error> {
        require("trip_id", trip_id)?;
        let url = self.endpoint(&["trips", trip_id, "hidden_gems"])?;
        let envelope: GemsEnvelope = self.get_with_params(url, &query.params()).await?;
        Ok(envelope.gems)
    }
}

pub(crate) fn validate_create(request: &CreateTripRequest) -> Result<(), Error> {
    require("destination", &request.destination)?;
    if !(1..=MAX_TRAVELERS).contains(&request.travelers) {
        return Err(Error::validation(
            "travelers",
            format!("must be between 1 and {MAX_TRAVELERS}"),
        ));
    }
    if let Some(days) = request.duration_days {
        if !(1..=MAX_DURATION_DAYS).contains(&days) {
            return Err(Error::validation(
                "duration_days",
                format!("must be between 1 and {MAX_DURATION_DAYS}"),
            ));
        }
    }
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if end < start {
            return Err(Error::validation("end_date", "must not be before start_date"));
        }
    }
    if let Some(budget) = request.budget_in_inr {
        if !budget.is_finite() || budget < 0.0 {
            return Err(Error::validation("budget_in_inr", "must be a non-negative number"));
        }
    }
    Ok(())
}
