use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze flight-booking transactions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every analysis and print a combined report
    Report(ReportArgs),
    /// Most frequently booked routes
    Routes(RoutesArgs),
    /// Mean and median price per traveler on the top routes
    Prices(InputArgs),
    /// Cheapest and most expensive airline on each top route
    Airlines(AirlinesArgs),
    /// Average yearly trips per user between two cities
    Frequency(FrequencyArgs),
    /// Best number of days to book ahead on each top route
    LeadTime(LeadTimeArgs),
    /// Price by cabin class on the most frequent route
    Cabins(InputArgs),
    /// Cheapest travel month and cheapest single booking
    Seasonal(SeasonalArgs),
    /// Write the default column schema as YAML
    Schema(SchemaArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Booking CSV file (use - for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Analysis configuration YAML (schema, thresholds, city pairs)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of top routes considered by route-level analyses
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct AirlinesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Cabin buckets averaging below this price per traveler are ignored
    #[arg(long = "min-price")]
    pub min_price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// One city of the pair (both directions are counted)
    #[arg(long)]
    pub from: Option<String>,
    /// The other city of the pair
    #[arg(long)]
    pub to: Option<String>,
    /// Departure year to analyze
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Args)]
pub struct LeadTimeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Only bookings with an order amount above this value are considered
    #[arg(long = "min-amount")]
    pub min_amount: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SeasonalArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// One city of the seasonal pair (both directions are counted)
    #[arg(long)]
    pub from: Option<String>,
    /// The other city of the seasonal pair
    #[arg(long)]
    pub to: Option<String>,
    /// Departure city of the route searched for the single cheapest booking
    #[arg(long = "route-from")]
    pub route_from: Option<String>,
    /// Arrival city of the route searched for the single cheapest booking
    #[arg(long = "route-to")]
    pub route_to: Option<String>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
