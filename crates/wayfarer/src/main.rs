mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use wayfarer_core::{Planner, PlannerEvent};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wayfarer", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the backend through a Planner
        cmd => {
            let cfg = wayfarer_config::load_config()?;
            let profile = cfg.active_profile_name(cli.global.profile.as_deref());
            let planner = Planner::new(&config::resolve(&cli.global, &cfg)?)?;
            let mut notices = planner.events();

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &planner, &cli.global).await;
            print_notices(&mut notices, cli.global.quiet);

            result.map_err(|err| match err {
                CliError::NotSignedIn { .. } => CliError::NotSignedIn { profile },
                other => other,
            })
        }
    }
}

/// Echo what the Planner did as one-line notices on stderr.
///
/// Failures are skipped here; the error report that follows covers them.
fn print_notices(rx: &mut broadcast::Receiver<Arc<PlannerEvent>>, quiet: bool) {
    while let Ok(event) = rx.try_recv() {
        if quiet || event.is_failure() {
            continue;
        }
        eprintln!("✓ {event}");
    }
}
