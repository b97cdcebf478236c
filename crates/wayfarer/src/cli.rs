//! Clap derive structures for the `wayfarer` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use wayfarer_core::models::TripStatus;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wayfarer -- customize trips and reserve travel inventory
#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    version,
    about = "Customize trip itineraries and reserve travel inventory",
    long_about = "Edit generated itineraries (swap, add, remove items), place and\n\
        release time-boxed holds, then finalize bookings against the trip\n\
        planning backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "WAYFARER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "WAYFARER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides the profile's token chain, which already
    /// reads WAYFARER_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WAYFARER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress notices and non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local backends only)
    #[arg(long, short = 'k', env = "WAYFARER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WAYFARER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// View, create and customize trips
    #[command(alias = "trip", alias = "t")]
    Trips(TripsArgs),

    /// Place and release reservation holds
    #[command(alias = "res", alias = "r")]
    Reservations(ReservationsArgs),

    /// View, finalize and cancel bookings
    #[command(alias = "b")]
    Bookings(BookingsArgs),

    /// Start payments for held reservations
    #[command(alias = "pay")]
    Payments(PaymentsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TRIPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TripsArgs {
    #[command(subcommand)]
    pub command: TripsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TripsCommand {
    /// List trips
    #[command(alias = "ls")]
    List {
        /// Only trips in this state
        #[arg(long)]
        status: Option<TripStatusArg>,
    },

    /// Show a trip's itinerary
    Show {
        /// Trip ID
        trip: String,
    },

    /// Ask the planner to generate a new trip
    Create(CreateTripArgs),

    /// Replace an itinerary item with an alternative
    Swap {
        /// Trip ID
        trip: String,

        /// Item type (hotel, activity, restaurant, flight, transport, ...)
        #[arg(long = "type", short = 't')]
        item_type: String,

        /// ID of the item being replaced
        #[arg(long)]
        item: String,

        /// ID of the replacement
        #[arg(long = "with")]
        alternative: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Add an alternative to the itinerary
    Add {
        /// Trip ID
        trip: String,

        /// Item type
        #[arg(long = "type", short = 't')]
        item_type: String,

        /// ID of the alternative to add
        #[arg(long)]
        alternative: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Remove an item from the itinerary
    #[command(alias = "rm")]
    Remove {
        /// Trip ID
        trip: String,

        /// Item type
        #[arg(long = "type", short = 't')]
        item_type: String,

        /// ID of the item to remove
        #[arg(long)]
        item: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Apply a batch of actions read from a JSON file
    Customize {
        /// Trip ID
        trip: String,

        /// JSON file: an array of actions or `{"actions": [...]}`
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },

    /// Show alternatives for an itinerary item
    #[command(alias = "alts")]
    Alternatives {
        /// Trip ID
        trip: String,

        /// Item type
        #[arg(long = "type", short = 't')]
        item_type: String,

        /// ID of the current item
        #[arg(long)]
        current: String,

        /// Maximum price
        #[arg(long)]
        max_price: Option<f64>,

        /// Maximum distance from the current item, in km
        #[arg(long)]
        distance_km: Option<f64>,
    },

    /// Show the forecast for a trip's destination
    Weather {
        /// Trip ID
        trip: String,
    },

    /// Find lesser-known places near a trip's destination
    Gems {
        /// Trip ID
        trip: String,

        /// Topics to search for (comma-separated)
        #[arg(long, value_delimiter = ',')]
        filter: Vec<String>,

        /// Search radius in metres
        #[arg(long, default_value_t = 5000)]
        radius: u32,
    },
}

#[derive(Debug, Args)]
pub struct CreateTripArgs {
    /// Destination city or region
    #[arg(long, short = 'd')]
    pub destination: String,

    #[arg(long)]
    pub origin: Option<String>,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Trip length in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Total budget in INR
    #[arg(long)]
    pub budget: Option<f64>,

    /// Themes such as heritage, food, nightlife (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub themes: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub travelers: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TripStatusArg {
    Draft,
    Pending,
    Confirmed,
    Booked,
    Cancelled,
}

impl From<TripStatusArg> for TripStatus {
    fn from(arg: TripStatusArg) -> Self {
        match arg {
            TripStatusArg::Draft => Self::Draft,
            TripStatusArg::Pending => Self::Pending,
            TripStatusArg::Confirmed => Self::Confirmed,
            TripStatusArg::Booked => Self::Booked,
            TripStatusArg::Cancelled => Self::Cancelled,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESERVATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// Place a hold on quoted items
    Hold {
        /// Trip ID
        trip: String,

        /// Item to hold: type:quote_id[:amount[:currency]] (repeatable)
        #[arg(long = "item", short = 'i', required = true, value_parser = parse_item_spec)]
        items: Vec<ItemSpec>,

        /// Hold lifetime in minutes (defaults to the profile's)
        #[arg(long)]
        ttl: Option<u32>,

        /// Reuse a key from an earlier attempt instead of deriving one
        #[arg(long)]
        idempotency_key: Option<String>,
    },

    /// Release a hold
    #[command(alias = "release")]
    Cancel {
        /// Reservation ID
        reservation: String,
    },
}

/// One `--item` value before currency defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub item_type: String,
    pub quote_id: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

pub fn parse_item_spec(raw: &str) -> Result<ItemSpec, String> {
    let mut parts = raw.split(':').map(str::trim);
    let item_type = parts.next().filter(|s| !s.is_empty());
    let quote_id = parts.next().filter(|s| !s.is_empty());
    let (Some(item_type), Some(quote_id)) = (item_type, quote_id) else {
        return Err(format!("expected type:quote_id[:amount[:currency]], got '{raw}'"));
    };

    let amount = match parts.next().filter(|s| !s.is_empty()) {
        Some(a) => Some(
            a.parse::<f64>()
                .map_err(|_| format!("invalid amount '{a}'"))?,
        ),
        None => None,
    };
    let currency = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    if parts.next().is_some() {
        return Err(format!("too many fields in '{raw}'"));
    }

    Ok(ItemSpec {
        item_type: item_type.to_owned(),
        quote_id: quote_id.to_owned(),
        amount,
        currency,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BOOKINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BookingsArgs {
    #[command(subcommand)]
    pub command: BookingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookingsCommand {
    /// List bookings
    #[command(alias = "ls")]
    List,

    /// Show a booking
    Show {
        /// Booking ID
        booking: String,
    },

    /// Cancel a booking
    Cancel {
        /// Booking ID
        booking: String,
    },

    /// Turn a paid reservation into a confirmed booking
    Finalize {
        /// Trip ID
        trip: String,

        #[arg(long)]
        reservation: String,

        #[arg(long)]
        payment: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PAYMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// Create a payment for a held reservation
    Checkout {
        /// Reservation ID
        reservation: String,

        #[arg(long)]
        amount: f64,

        /// Currency code (defaults to the profile's)
        #[arg(long)]
        currency: Option<String>,

        /// Print the payment client secret
        #[arg(long)]
        show_secret: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long = "for")]
        profile: Option<String>,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn item_spec_forms() {
        assert_eq!(
            parse_item_spec("activity:quote_123").unwrap(),
            ItemSpec {
                item_type: "activity".into(),
                quote_id: "quote_123".into(),
                amount: None,
                currency: None,
            }
        );

        let full = parse_item_spec("hotel:q9:4200.50:usd").unwrap();
        assert_eq!(full.amount, Some(4200.5));
        assert_eq!(full.currency.as_deref(), Some("usd"));

        // Empty amount slot keeps the currency.
        let skipped = parse_item_spec("hotel:q9::EUR").unwrap();
        assert_eq!(skipped.amount, None);
        assert_eq!(skipped.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn item_spec_rejects_malformed() {
        assert!(parse_item_spec("activity").is_err());
        assert!(parse_item_spec(":quote").is_err());
        assert!(parse_item_spec("hotel:q9:lots").is_err());
        assert!(parse_item_spec("hotel:q9:1:INR:extra").is_err());
    }

    #[test]
    fn hold_requires_an_item() {
        let err = Cli::try_parse_from(["wayfarer", "reservations", "hold", "trip_001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "wayfarer",
            "reservations",
            "hold",
            "trip_001",
            "--item",
            "activity:quote_123:1500",
            "-i",
            "hotel:q9",
            "--ttl",
            "45",
        ])
        .unwrap();
        let Command::Reservations(ReservationsArgs {
            command: ReservationsCommand::Hold { items, ttl, .. },
        }) = cli.command
        else {
            panic!("expected hold");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(ttl, Some(45));
    }
}
