//! Command dispatch: bridges CLI args -> Planner calls -> output formatting.

pub mod bookings;
pub mod config_cmd;
pub mod payments;
pub mod reservations;
pub mod trips;
pub mod util;

use wayfarer_core::Planner;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, planner: &Planner, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Trips(args) => trips::handle(planner, args, global).await,
        Command::Reservations(args) => reservations::handle(planner, args, global).await,
        Command::Bookings(args) => bookings::handle(planner, args, global).await,
        Command::Payments(args) => payments::handle(planner, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
