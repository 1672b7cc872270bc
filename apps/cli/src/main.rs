//! # lendly: Command-Line Front End
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application Startup                              │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. Initialize tracing (stderr, RUST_LOG)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Load ClientConfig (defaults → file → env → --api-url)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  4. Build HttpRentalApi / AvailabilityService once                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  5. Run the subcommand, print JSON to stdout                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use lendly_core::calendar::parse_api_date;
use lendly_core::RentalType;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lendly", version, about = "Rental pricing and availability from the command line")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a rental against a product's tiers
    Quote(QuoteArgs),
    /// Show which days a product can be rented
    Availability(AvailabilityArgs),
    /// Check a rental duration against limits (offline)
    Validate(ValidateArgs),
    /// Show or write the client configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Upper bound for `--days` and `--quantity`: one hundred years of days.
const MAX_RENTAL_UNITS: i64 = 36_500;

#[derive(Debug, Args)]
struct QuoteArgs {
    #[arg(long)]
    product: String,

    /// Rental length in days, billed daily
    #[arg(
        long,
        conflicts_with = "quantity",
        required_unless_present = "quantity",
        value_parser = clap::value_parser!(i64).range(0..=MAX_RENTAL_UNITS)
    )]
    days: Option<i64>,

    /// Number of tier units, e.g. `--quantity 2 --tier weekly`
    #[arg(
        long,
        requires = "tier",
        value_parser = clap::value_parser!(i64).range(0..=MAX_RENTAL_UNITS)
    )]
    quantity: Option<i64>,

    #[arg(long)]
    tier: Option<RentalType>,

    /// Rental start, used to show how many units the backend will bill
    #[arg(long, requires = "to", value_parser = parse_date)]
    from: Option<NaiveDate>,

    /// Rental end
    #[arg(long, requires = "from", value_parser = parse_date)]
    to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct AvailabilityArgs {
    #[arg(long)]
    product: String,

    /// First day (defaults to today)
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,

    /// Last day (defaults to the end of the lookahead window)
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,

    #[arg(long, default_value_t = lendly_core::DEFAULT_MIN_RENTAL_DAYS)]
    min: i64,

    #[arg(long)]
    max: Option<i64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_api_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got {raw:?}"))
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lendly=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = commands::load_config(cli.config.clone(), cli.api_url.clone())?;

    match cli.command {
        Command::Quote(args) => commands::quote(&config, args).await,
        Command::Availability(args) => commands::availability(&config, args).await,
        Command::Validate(args) => commands::validate(args),
        Command::Config { save } => commands::show_config(&config, cli.config, save),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_args() {
        let cli = Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--quantity", "2", "--tier", "weekly"])
            .unwrap();
        match cli.command {
            Command::Quote(args) => {
                assert_eq!(args.quantity, Some(2));
                assert_eq!(args.tier, Some(RentalType::Weekly));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quote_needs_days_or_quantity() {
        assert!(Cli::try_parse_from(["lendly", "quote", "--product", "p1"]).is_err());
        assert!(Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--quantity", "2"]).is_err());
        assert!(
            Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--days", "3", "--quantity", "2", "--tier", "weekly"])
                .is_err()
        );
    }

    #[test]
    fn test_quote_counts_are_bounded() {
        assert!(Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--days", "36500"]).is_ok());
        assert!(Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--days", "36501"]).is_err());
        assert!(Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--days", "-1"]).is_err());
        assert!(
            Cli::try_parse_from([
                "lendly", "quote", "--product", "p1", "--quantity", "10000000000000000", "--tier", "monthly"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_quote_date_span() {
        let cli = Cli::try_parse_from([
            "lendly", "quote", "--product", "p1", "--quantity", "1", "--tier", "weekly", "--from", "2024-03-01",
            "--to", "2024-03-11",
        ])
        .unwrap();
        match cli.command {
            Command::Quote(args) => {
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(args.to, NaiveDate::from_ymd_opt(2024, 3, 11));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["lendly", "quote", "--product", "p1", "--days", "3", "--from", "2024-03-01"])
                .is_err()
        );
    }

    #[test]
    fn test_availability_dates() {
        let cli = Cli::try_parse_from(["lendly", "availability", "--product", "p1", "--from", "2024-03-01"]).unwrap();
        match cli.command {
            Command::Availability(args) => {
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(args.to, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["lendly", "availability", "--product", "p1", "--from", "soon"]).is_err());
    }
}
