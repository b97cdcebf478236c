//! Booking command handlers.

use tabled::Tabled;

use wayfarer_core::Planner;
use wayfarer_core::models::{Booking, FinalizedBooking};

use crate::cli::{BookingsArgs, BookingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Trip")]
    trip: String,
    #[tabled(rename = "Reservation")]
    reservation: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl BookingRow {
    fn new(b: &Booking, color: bool) -> Self {
        Self {
            id: b.id.clone(),
            trip: b.itinerary_id.clone().unwrap_or_default(),
            reservation: b.reservation_id.clone().unwrap_or_default(),
            status: output::paint_status(&b.status.to_string(), color),
            created: b.created_at.clone().unwrap_or_default(),
        }
    }
}

fn detail(b: &Booking, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", b.id),
        format!("Trip:        {}", b.itinerary_id.as_deref().unwrap_or("-")),
        format!("Reservation: {}", b.reservation_id.as_deref().unwrap_or("-")),
        format!("Payment:     {}", b.payment_id.as_deref().unwrap_or("-")),
        format!("Status:      {}", output::paint_status(&b.status.to_string(), color)),
        format!("Created:     {}", b.created_at.as_deref().unwrap_or("-")),
    ];
    if !b.provider_refs.is_empty() {
        lines.push(format!("Providers:   {} reference(s)", b.provider_refs.len()));
    }
    lines.join("\n")
}

pub async fn handle(
    planner: &Planner,
    args: BookingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        BookingsCommand::List => {
            let bookings = planner.bookings().await?;
            let out = output::render_list(
                global.output,
                &bookings,
                |b| BookingRow::new(b, color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BookingsCommand::Show { booking } => {
            let booking = planner.booking(&booking).await?;
            let out = output::render_single(
                global.output,
                &booking,
                |b| detail(b, color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BookingsCommand::Cancel { booking } => {
            if !util::confirm(
                &format!("Cancel booking {booking}?"),
                "cancel booking",
                global.yes,
            )? {
                return Ok(());
            }
            let ack = planner.cancel_booking(&booking).await?;
            util::require_ack(&ack, "cancellation")
        }

        BookingsCommand::Finalize {
            trip,
            reservation,
            payment,
        } => {
            let booked = planner
                .finalize_booking(&trip, &reservation, &payment)
                .await?;
            let out = output::render_single(
                global.output,
                &booked,
                |b: &FinalizedBooking| {
                    format!(
                        "Booking {} is {}",
                        b.booking_id,
                        output::paint_status(&b.status.to_string(), color)
                    )
                },
                |b| b.booking_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
