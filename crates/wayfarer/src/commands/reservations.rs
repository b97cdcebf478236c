//! Reservation (hold) command handlers.

use std::fmt::Write as _;

use chrono::Utc;

use wayfarer_core::{CoreError, Hold, IdempotencyKey, Planner, build_reservation_item};
use wayfarer_core::models::ReservationItem;

use crate::cli::{GlobalOpts, ItemSpec, ReservationsArgs, ReservationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn hold_detail(h: &Hold, color: bool) -> String {
    let r = &h.reservation;
    let mut out = String::new();
    let _ = writeln!(out, "Reservation: {}", r.reservation_id);
    let _ = writeln!(out, "Trip:        {}", h.trip_id);
    let _ = writeln!(out, "State:       {}", output::paint_status(&h.state.to_string(), color));
    let _ = writeln!(
        out,
        "Total:       {}",
        output::money(r.total_amount, r.currency.as_deref())
    );
    match (r.expires_at.as_deref(), h.time_remaining(Utc::now())) {
        (Some(raw), Some(left)) => {
            let _ = writeln!(
                out,
                "Expires:     {raw} ({}m {:02}s left)",
                left.num_minutes(),
                left.num_seconds() % 60
            );
        }
        (Some(raw), None) => {
            let _ = writeln!(out, "Expires:     {raw}");
        }
        (None, _) => {}
    }
    let _ = writeln!(out, "Key:         {}", h.idempotency_key);
    for item in &r.items {
        let _ = writeln!(
            out,
            "  {:<11} {:<20} {:>12}  {}",
            item.item_type,
            item.provider_quote_id,
            output::money(item.amount, item.currency.as_deref()),
            item.mock_hold_id.as_deref().unwrap_or("")
        );
    }
    out.trim_end().to_owned()
}

/// Build reservation lines, filling in the profile's currency where the
/// `--item` value left it out.
fn reservation_items(
    specs: &[ItemSpec],
    default_currency: &str,
) -> Result<Vec<ReservationItem>, CliError> {
    specs
        .iter()
        .map(|s| {
            build_reservation_item(
                s.item_type.as_str(),
                &s.quote_id,
                s.amount,
                Some(s.currency.as_deref().unwrap_or(default_currency)),
            )
            .map_err(|e| CliError::from(CoreError::from(e)))
        })
        .collect()
}

pub async fn handle(
    planner: &Planner,
    args: ReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        ReservationsCommand::Hold {
            trip,
            items,
            ttl,
            idempotency_key,
        } => {
            let items = reservation_items(&items, planner.default_currency())?;
            let key = idempotency_key
                .as_deref()
                .map(IdempotencyKey::new)
                .transpose()
                .map_err(CoreError::from)?;
            let hold = planner.hold(&trip, &items, ttl, key).await?;
            let out = output::render_single(
                global.output,
                &hold,
                |h| hold_detail(h, color),
                |h| h.id().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReservationsCommand::Cancel { reservation } => {
            if !util::confirm(
                &format!("Release hold {reservation}?"),
                "release hold",
                global.yes,
            )? {
                return Ok(());
            }
            let ack = planner.release_id(&reservation).await?;
            util::require_ack(&ack, "release")
        }
    }
}
