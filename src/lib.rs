pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod derive;
pub mod error;
pub mod io_utils;
pub mod loader;
pub mod report;
pub mod schema;
pub mod select;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    config::{AnalysisConfig, CityPair},
    loader::{BookingTable, LoadOptions, LoadReport},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("fare_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Report(args) => handle_report(&args),
        Commands::Routes(args) => {
            let (config, table, _) = prepare(&args.input)?;
            let top = analysis::top_routes(&table, config.top_routes);
            print!("{}", report::render_top_routes(&top));
            Ok(())
        }
        Commands::Prices(args) => {
            let (config, table, _) = prepare(&args)?;
            let top = analysis::top_routes(&table, config.top_routes);
            let prices = analysis::route_price_summary(&table, &top)?;
            print!("{}", report::render_route_prices(&prices));
            Ok(())
        }
        Commands::Airlines(args) => {
            let (mut config, table, _) = prepare(&args.input)?;
            if let Some(min_price) = args.min_price {
                config.min_reasonable_price = min_price;
            }
            config.validate()?;
            let top = analysis::top_routes(&table, config.top_routes);
            let extremes =
                analysis::airline_price_extremes(&table, &top, config.min_reasonable_price);
            let rows = report::join_airline_extremes(&extremes);
            print!("{}", report::render_airline_comparison(&rows));
            Ok(())
        }
        Commands::Frequency(args) => {
            let (mut config, table, _) = prepare(&args.input)?;
            override_pair(&mut config.frequency_pair, args.from, args.to);
            if let Some(year) = args.year {
                config.frequency_year = year;
            }
            let frequency = analysis::average_trip_frequency(
                &table,
                &config.frequency_pair,
                config.frequency_year,
            );
            print!("{}", report::render_trip_frequency(frequency.as_ref()));
            Ok(())
        }
        Commands::LeadTime(args) => {
            let (mut config, table, _) = prepare(&args.input)?;
            if let Some(min_amount) = args.min_amount {
                config.lead_time_min_amount = min_amount;
            }
            config.validate()?;
            let top = analysis::top_routes(&table, config.top_routes);
            let lead_times = analysis::best_lead_times(&table, &top, config.lead_time_min_amount)?;
            print!("{}", report::render_lead_times(&lead_times));
            Ok(())
        }
        Commands::Cabins(args) => {
            let (_, table, _) = prepare(&args)?;
            let comparison = analysis::cabin_price_comparison(&table)?;
            print!("{}", report::render_cabin_comparison(comparison.as_ref()));
            Ok(())
        }
        Commands::Seasonal(args) => {
            let (mut config, table, _) = prepare(&args.input)?;
            override_pair(&mut config.seasonal_pair, args.from, args.to);
            override_pair(
                &mut config.cheapest_booking_route,
                args.route_from,
                args.route_to,
            );
            let seasonal = analysis::SeasonalFindings {
                cheapest_month: analysis::cheapest_month(&table, &config.seasonal_pair)?,
                cheapest_booking: analysis::cheapest_booking(
                    &table,
                    &config.cheapest_booking_route,
                )?,
            };
            print!("{}", report::render_seasonal(&seasonal));
            Ok(())
        }
        Commands::Schema(args) => handle_schema(&args),
    }
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let (config, table, load) = prepare(&args.input)?;
    let findings = analysis::run_all(&table, &config).context("Running analyses")?;
    let assembled = report::assemble(load, findings);
    match args.format {
        OutputFormat::Table => print!("{}", assembled.render()),
        OutputFormat::Json => println!("{}", assembled.to_json()?),
    }
    info!("Report complete");
    Ok(())
}

fn handle_schema(args: &cli::SchemaArgs) -> Result<()> {
    let schema = schema::Schema::default();
    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!("Default schema written to {path:?}");
        }
        None => print!("{}", schema.to_yaml_string()?),
    }
    Ok(())
}

/// Resolves configuration and loads the booking table. A load failure aborts
/// before any analysis runs.
fn prepare(args: &InputArgs) -> Result<(AnalysisConfig, BookingTable, LoadReport)> {
    let mut config = match &args.config {
        Some(path) => {
            AnalysisConfig::load(path).with_context(|| format!("Loading config from {path:?}"))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(top) = args.top {
        config.top_routes = top;
    }
    config.validate()?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let options = LoadOptions {
        delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        null_tokens: config.null_tokens(),
    };
    info!(
        "Reading '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let (table, load) = loader::load_bookings(&args.input, &config.schema, &options)?;
    debug!("Load report: {load:?}");
    Ok((config, table, load))
}

fn override_pair(pair: &mut CityPair, from: Option<String>, to: Option<String>) {
    if let Some(from) = from {
        pair.from = from;
    }
    if let Some(to) = to {
        pair.to = to;
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
