//! Command line interface

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use decimal_percentage::Percentage;
use jiff::{Timestamp, Zoned, civil::Date};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info};

use outboard_quote::{
    config::{ConfigError, PricingConfig},
    fixtures::{Catalog, FixtureError, values::parse_percentage},
    money::{self, PricingError},
    packages::{BoatType, PackageId, PurchasePath},
    promotions::BonusChoice,
    quote::QuoteSession,
    quote_sheet::{QuoteSheet, QuoteSheetError},
    snapshot::{QuoteSnapshot, SnapshotError},
    trade_in::TradeInInfo,
};

use crate::logging::LoggingConfig;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum CliError {
    /// Catalog could not be loaded or a key was not found
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Pricing config could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Inputs in the wrong currency
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Snapshot could not be read or written
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Quote sheet could not be written
    #[error(transparent)]
    Sheet(#[from] QuoteSheetError),

    /// Reading or writing a snapshot file failed
    #[error("{path}: {source}")]
    File {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "outboard-quote", about = "Outboard motor quoting", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the motors in a catalog
    Motors(CatalogArgs),

    /// Price a motor with promotions, options and the three package tiers
    Quote(Box<QuoteArgs>),

    /// Recompute a saved quote
    Restore(RestoreArgs),
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Fixtures directory
    #[arg(long, env = "OUTBOARD_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Fixture set name
    #[arg(long, env = "OUTBOARD_FIXTURE_SET", default_value = "mercury_2026")]
    set: String,

    /// Pricing config YAML; built-in defaults when omitted
    #[arg(long, env = "OUTBOARD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[command(flatten)]
    catalog: CatalogArgs,

    /// Motor key
    motor: String,

    /// Boat the motor is going on, e.g. pontoon or center-console
    #[arg(long)]
    boat_type: Option<BoatType>,

    /// Dealer rigs and installs the motor
    #[arg(long)]
    installed: bool,

    /// Option key to add; repeatable
    #[arg(long = "option")]
    options: Vec<String>,

    /// Estimated trade-in value
    #[arg(long)]
    trade_in: Option<Decimal>,

    /// Fraction of the trade-in estimate kept, e.g. 0.8 or 80%
    #[arg(long, requires = "trade_in", value_parser = parse_percentage)]
    trade_in_penalty: Option<Percentage>,

    /// Why the trade-in penalty applies
    #[arg(long, requires = "trade_in_penalty")]
    trade_in_reason: Option<String>,

    /// Staff discount
    #[arg(long)]
    admin_discount: Option<Decimal>,

    /// Notes recorded with the staff discount
    #[arg(long, requires = "admin_discount")]
    admin_notes: Option<String>,

    /// Promotion bonus: no-payments, special-financing[:TERM] or cash-rebate
    #[arg(long)]
    bonus: Option<BonusChoice>,

    /// Down payment
    #[arg(long)]
    down_payment: Option<Decimal>,

    /// Quote date; today when omitted
    #[arg(long)]
    as_of: Option<Date>,

    /// Package tier to save with the quote: essential, complete or premium
    #[arg(long)]
    package: Option<PackageId>,

    /// Write a JSON snapshot of the quote here
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RestoreArgs {
    /// Snapshot file
    path: PathBuf,
}

/// Run the parsed command, writing output to `out`.
pub fn run(cli: Cli, out: impl io::Write) -> Result<(), CliError> {
    match cli.command {
        Commands::Motors(args) => list_motors(&args, out),
        Commands::Quote(args) => quote(&args, out),
        Commands::Restore(args) => restore(&args, out),
    }
}

fn load_catalog(args: &CatalogArgs) -> Result<Catalog<'static>, CliError> {
    let mut catalog = Catalog::with_base_path(&args.fixtures);

    catalog.load_set(&args.set)?;

    info!(set = %args.set, motors = catalog.motors().len(), "catalog loaded");

    Ok(catalog)
}

fn load_config(
    args: &CatalogArgs,
    currency: &'static Currency,
) -> Result<PricingConfig<'static>, CliError> {
    match &args.config {
        Some(path) => {
            let config = PricingConfig::load(path)?;

            debug!(path = %path.display(), "pricing config loaded");

            Ok(config)
        }
        None => Ok(PricingConfig::for_currency(currency)),
    }
}

fn list_motors(args: &CatalogArgs, mut out: impl io::Write) -> Result<(), CliError> {
    let catalog = load_catalog(args)?;

    for (key, motor) in catalog.motors() {
        let stock = if motor.in_stock { "" } else { " (order)" };

        writeln!(
            out,
            "{key:<20} {:<40} {}{stock}",
            motor.display_name(),
            money::rounded(&motor.msrp)
        )
        .map_err(QuoteSheetError::from)?;
    }

    Ok(())
}

fn quote(args: &QuoteArgs, out: impl io::Write) -> Result<(), CliError> {
    let catalog = load_catalog(&args.catalog)?;
    let currency = catalog.currency()?;
    let config = load_config(&args.catalog, currency)?;
    let motor = catalog.motor(&args.motor)?;
    let as_of = args.as_of.unwrap_or_else(|| Zoned::now().date());
    let in_currency = |value: Decimal| money::exact(value, currency);

    let mut session = QuoteSession::new(motor, catalog.promotions(), as_of);

    for key in &args.options {
        session.add_option(catalog.option(key)?.clone())?;
    }

    if let Some(value) = args.trade_in {
        let trade_in = TradeInInfo::with_value(in_currency(value));

        session.set_trade_in(match args.trade_in_penalty {
            Some(factor) => trade_in.with_penalty(
                factor,
                args.trade_in_reason.clone().unwrap_or_default(),
            ),
            None => trade_in,
        })?;
    }

    if let Some(discount) = args.admin_discount {
        session.set_admin_discount(in_currency(discount), args.admin_notes.clone())?;
    }

    if let Some(down_payment) = args.down_payment {
        session.set_down_payment(in_currency(down_payment))?;
    }

    if let Some(choice) = args.bonus {
        session.choose_bonus(choice);
    }

    let purchase_path = if args.installed {
        PurchasePath::Installed
    } else {
        PurchasePath::Loose
    };

    let recommendation = session.recommend(&config, args.boat_type, purchase_path);
    let packages = session.packages(&config, catalog.warranty_table()?, &recommendation)?;
    let totals = session.totals(&config)?;
    let payment = session.monthly_payment(&config)?;

    let promotions = session
        .promotions()
        .applied_rules
        .iter()
        .map(|rule| rule.name.clone());

    QuoteSheet::new(motor.display_name(), &totals, &payment)
        .with_promotions(promotions)
        .with_packages(&packages)
        .with_notices(session.notices())
        .with_notices([format!("Recommended: {}", recommendation.reason)])
        .write_to(out)?;

    if let Some(path) = &args.save {
        let selected = args
            .package
            .and_then(|id| packages.iter().find(|package| package.id == id));

        let snapshot = QuoteSnapshot::capture(&session, &config, selected)?
            .saved_at(Timestamp::now());

        write_file(path, &snapshot.to_json()?)?;

        info!(path = %path.display(), "quote saved");
    }

    Ok(())
}

fn restore(args: &RestoreArgs, out: impl io::Write) -> Result<(), CliError> {
    let json = fs::read_to_string(&args.path).map_err(|source| CliError::File {
        path: args.path.clone(),
        source,
    })?;

    let snapshot = QuoteSnapshot::from_json(&json)?;
    let totals = snapshot.recompute()?;
    let payment = snapshot.recompute_payment()?;

    let mut title = snapshot.motor.model.clone();

    if let Some(package) = snapshot.package {
        title = format!("{title} ({} package)", package.label());
    }

    QuoteSheet::new(title, &totals, &payment)
        .with_promotions(snapshot.promotions.iter().cloned())
        .with_notices(snapshot.admin_notes.iter())
        .write_to(out)?;

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}
