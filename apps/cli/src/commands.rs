//! Subcommand implementations. Each prints one JSON (or TOML) document to stdout.

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use lendly_client::{
    quote_product, AvailabilityBoard, AvailabilityService, ClientConfig, HttpRentalApi,
};
use lendly_core::validation::validate_duration;
use lendly_core::{DateRange, RentalSelection, YearMonth};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::{AvailabilityArgs, QuoteArgs, ValidateArgs};

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Loads config, applying `--api-url` last.
pub fn load_config(path: Option<PathBuf>, api_url: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(path).context("loading client configuration")?;
    if let Some(url) = api_url {
        debug!(url = %url, "Overriding API URL from command line");
        config.api.base_url = url;
        config.validate().context("invalid --api-url")?;
    }
    Ok(config)
}

pub async fn quote(config: &ClientConfig, args: QuoteArgs) -> anyhow::Result<()> {
    let selection = match (args.days, args.quantity, args.tier) {
        (Some(days), _, _) => RentalSelection::Days { days },
        (None, Some(quantity), Some(rental_type)) => RentalSelection::Quantity {
            rental_type,
            quantity,
        },
        _ => bail!("pass either --days or --quantity with --tier"),
    };

    let api = HttpRentalApi::new(config)?;
    let mut quote = quote_product(&api, &args.product, selection)
        .await
        .with_context(|| format!("pricing product {}", args.product))?;

    if let (Some(from), Some(to)) = (args.from, args.to) {
        let range = DateRange::new(from, to)?;
        quote = quote.with_span(range.span_days());
    }

    print_json(&quote)
}

#[derive(Serialize)]
struct AvailabilityReport<'a> {
    product_id: &'a str,
    can_submit: bool,
    #[serde(flatten)]
    board: lendly_client::BoardSnapshot,
}

pub async fn availability(config: &ClientConfig, args: AvailabilityArgs) -> anyhow::Result<()> {
    let from = args.from.unwrap_or_else(|| Local::now().date_naive());
    let to = match args.to {
        Some(to) => to,
        None => lookahead_end(from, config.availability.lookahead_months)
            .context("lookahead window runs past the calendar")?,
    };
    let range = DateRange::new(from, to)?;

    let api = HttpRentalApi::new(config)?;
    let service = AvailabilityService::new(Arc::new(api));
    let board = AvailabilityBoard::new();

    info!(product_id = %args.product, %from, %to, "Checking availability");
    service.refresh(&board, &args.product, range).await;

    let report = AvailabilityReport {
        product_id: &args.product,
        can_submit: board.can_submit(&range).await,
        board: board.snapshot().await,
    };
    print_json(&report)
}

/// Last day of the `months`-th month counted from the one containing `from`.
fn lookahead_end(from: NaiveDate, months: u32) -> Option<NaiveDate> {
    let mut month = YearMonth::of(from);
    for _ in 0..months {
        month = month.succ();
    }
    NaiveDate::from_ymd_opt(month.year(), month.month(), 1)?.pred_opt()
}

pub fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    let check = validate_duration(&args.from, &args.to, args.min, args.max);
    print_json(&check)
}

pub fn show_config(config: &ClientConfig, path: Option<PathBuf>, save: bool) -> anyhow::Result<()> {
    if save {
        config.save(path).context("saving client configuration")?;
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
