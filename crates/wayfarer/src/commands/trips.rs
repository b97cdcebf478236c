//! Trip command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use wayfarer_core::models::{
    Alternative, AlternativeConstraints, CreateTripRequest, CreatedTrip, GemQuery, HiddenGem,
    ItemType, Trip, Weather,
};
use wayfarer_core::{Action, CoreError, Planner, build_add, build_remove, build_swap};

use crate::cli::{CreateTripArgs, GlobalOpts, TripsArgs, TripsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Days")]
    days: usize,
    #[tabled(rename = "Travelers")]
    travelers: u32,
}

impl TripRow {
    fn new(t: &Trip, color: bool) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title(),
            destination: t.destination().to_owned(),
            status: output::paint_status(t.status.as_str(), color),
            days: t.summary.days.len(),
            travelers: t.travelers(),
        }
    }
}

#[derive(Tabled)]
struct AlternativeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Quote")]
    quote: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&Alternative> for AlternativeRow {
    fn from(a: &Alternative) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone().unwrap_or_default(),
            quote: a.quote_id.clone().unwrap_or_else(|| "-".into()),
            price: output::money(a.price(), None),
        }
    }
}

#[derive(Tabled)]
struct GemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&HiddenGem> for GemRow {
    fn from(g: &HiddenGem) -> Self {
        let kind = ["tourism", "amenity", "natural", "historic", "leisure"]
            .iter()
            .find_map(|k| g.tags.get(*k).map(|v| format!("{k}={v}")))
            .unwrap_or_default();
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            kind,
            location: match (g.lat, g.lng) {
                (Some(lat), Some(lng)) => format!("{lat:.4}, {lng:.4}"),
                _ => "-".into(),
            },
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn trip_detail(t: &Trip, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", t.id);
    let _ = writeln!(out, "Title:       {}", t.title());
    let _ = writeln!(out, "Destination: {}", t.destination());
    let _ = writeln!(out, "Status:      {}", output::paint_status(t.status.as_str(), color));
    let _ = writeln!(out, "Travelers:   {}", t.travelers());
    if let (Some(start), Some(end)) = (&t.input.start_date, &t.input.end_date) {
        let _ = writeln!(out, "Dates:       {start} .. {end}");
    }
    if let Some(budget) = t.input.budget_in_inr {
        let _ = writeln!(out, "Budget:      {}", output::money(Some(budget), Some("INR")));
    }
    if !t.input.themes.is_empty() {
        let _ = writeln!(out, "Themes:      {}", t.input.themes.join(", "));
    }
    if !t.reservations.is_empty() {
        let _ = writeln!(out, "Holds:       {}", t.reservations.join(", "));
    }

    for (n, day) in t.summary.days.iter().enumerate() {
        let _ = writeln!(
            out,
            "\nDay {}{}",
            n + 1,
            day.date
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default()
        );
        for item in &day.activities {
            let kind = item
                .item_type
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string);
            let status = item
                .status
                .map(|s| output::paint_status(&s.to_string(), color))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {kind:<11} {:<16} {:<32} {:>12}  {status}",
                item.id,
                item.name.as_deref().unwrap_or("-"),
                output::money(item.price(), item.currency.as_deref()),
            );
        }
    }
    out.trim_end().to_owned()
}

fn weather_detail(w: &Weather) -> String {
    if w.daily.is_empty() {
        return "No forecast available".into();
    }
    w.daily
        .iter()
        .map(|d| {
            let temp = d.temp.as_ref().map_or_else(
                || "-".into(),
                |t| match (t.min, t.max) {
                    (Some(min), Some(max)) => format!("{min:.0}..{max:.0}°C"),
                    _ => t.day.map_or_else(|| "-".into(), |day| format!("{day:.0}°C")),
                },
            );
            let sky = d
                .weather
                .first()
                .and_then(|c| c.description.as_deref().or(c.main.as_deref()))
                .unwrap_or("-");
            format!("{:<10}  {temp:<12}  rain {:>3.0}%  {sky}", d.dt, d.pop * 100.0)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(planner: &Planner, args: TripsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        TripsCommand::List { status } => {
            let trips = planner.trips(status.map(Into::into)).await?;
            let out = output::render_list(
                global.output,
                &trips,
                |t| TripRow::new(t, color),
                |t| t.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TripsCommand::Show { trip } => {
            let trip = planner.trip(&trip).await?;
            print_trip(&trip, global, color)
        }

        TripsCommand::Create(create) => {
            let created = planner.create_trip(&create_request(create)).await?;
            let out = output::render_single(
                global.output,
                &created,
                |c: &CreatedTrip| format!("Trip {} is being planned", c.itinerary_id),
                |c| c.itinerary_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TripsCommand::Swap {
            trip,
            item_type,
            item,
            alternative,
            reason,
        } => {
            let action = build_swap(item_type.as_str(), &item, &alternative, reason.as_deref())
                .map_err(CoreError::from)?;
            apply(planner, &trip, &[action], global, color).await
        }

        TripsCommand::Add {
            trip,
            item_type,
            alternative,
            reason,
        } => {
            let action = build_add(item_type.as_str(), &alternative, reason.as_deref())
                .map_err(CoreError::from)?;
            apply(planner, &trip, &[action], global, color).await
        }

        TripsCommand::Remove {
            trip,
            item_type,
            item,
            reason,
        } => {
            let action = build_remove(item_type.as_str(), &item, reason.as_deref())
                .map_err(CoreError::from)?;
            apply(planner, &trip, &[action], global, color).await
        }

        TripsCommand::Customize { trip, from_file } => {
            let actions = util::read_actions_file(&from_file)?;
            apply(planner, &trip, &actions, global, color).await
        }

        TripsCommand::Alternatives {
            trip,
            item_type,
            current,
            max_price,
            distance_km,
        } => {
            let constraints = (max_price.is_some() || distance_km.is_some()).then(|| {
                AlternativeConstraints {
                    max_price,
                    distance_km,
                    ..AlternativeConstraints::default()
                }
            });
            let alternatives = planner
                .alternatives(
                    &trip,
                    &ItemType::from(item_type),
                    &current,
                    constraints.as_ref(),
                )
                .await?;
            let out = output::render_list(
                global.output,
                &alternatives,
                |a| AlternativeRow::from(a),
                |a| a.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TripsCommand::Weather { trip } => {
            let weather = planner.weather(&trip).await?;
            let out = output::render_single(global.output, &weather, weather_detail, |w| {
                w.daily
                    .iter()
                    .map(|d| d.dt.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TripsCommand::Gems {
            trip,
            filter,
            radius,
        } => {
            let query = GemQuery {
                topics: filter,
                radius_m: radius,
            };
            let gems = planner.hidden_gems(&trip, &query).await?;
            let out = output::render_list(global.output, &gems, |g| GemRow::from(g), |g| g.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Submit a batch and show the trip as the server now has it.
async fn apply(
    planner: &Planner,
    trip_id: &str,
    actions: &[Action],
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let trip = planner.apply(trip_id, actions).await?;
    print_trip(&trip, global, color)
}

fn print_trip(trip: &Trip, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let out = output::render_single(
        global.output,
        trip,
        |t| trip_detail(t, color),
        |t| t.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn create_request(args: CreateTripArgs) -> CreateTripRequest {
    CreateTripRequest {
        destination: args.destination,
        origin: args.origin,
        start_date: args.start,
        end_date: args.end,
        duration_days: args.days,
        budget_in_inr: args.budget,
        themes: args
            .themes
            .into_iter()
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect(),
        travelers: args.travelers,
        preferences: None,
    }
}
