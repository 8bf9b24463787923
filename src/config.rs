use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    data::{DEFAULT_NULL_TOKENS, NullTokens},
    schema::Schema,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityPair {
    pub from: String,
    pub to: String,
}

impl CityPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub null_tokens: Vec<String>,
    pub top_routes: usize,
    pub min_reasonable_price: f64,
    pub lead_time_min_amount: f64,
    pub frequency_pair: CityPair,
    pub frequency_year: i32,
    pub seasonal_pair: CityPair,
    pub cheapest_booking_route: CityPair,
    pub schema: Schema,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| t.to_string()).collect(),
            top_routes: 10,
            min_reasonable_price: 10.0,
            lead_time_min_amount: 30.0,
            frequency_pair: CityPair::new("New York", "Chicago"),
            frequency_year: 2023,
            seasonal_pair: CityPair::new("New York", "Chicago"),
            cheapest_booking_route: CityPair::new("New York", "Boston"),
            schema: Schema::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let mut config: AnalysisConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config.schema = config.schema.with_defaults();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.top_routes > 0, "top_routes must be at least 1");
        ensure!(
            self.min_reasonable_price.is_finite() && self.min_reasonable_price >= 0.0,
            "min_reasonable_price must be a non-negative number"
        );
        ensure!(
            self.lead_time_min_amount.is_finite(),
            "lead_time_min_amount must be a finite number"
        );
        self.schema.validate()?;
        Ok(())
    }

    pub fn null_tokens(&self) -> NullTokens {
        NullTokens::new(self.null_tokens.iter().cloned())
    }
}
