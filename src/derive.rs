//! Derived booking fields.
//!
//! Each function is pure over its inputs. Callers are responsible for the
//! guards the functions document (positive traveler counts, non-negative
//! lead times) before feeding results into aggregates.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

pub const ROUTE_SEPARATOR: &str = " -- ";

/// Directional route key. `route("A", "B")` and `route("B", "A")` differ.
pub fn route(departure: &str, arrival: &str) -> String {
    format!("{departure}{ROUTE_SEPARATOR}{arrival}")
}

pub fn price_per_traveler(amount: f64, travelers: i16) -> PipelineResult<f64> {
    if travelers <= 0 {
        return Err(PipelineError::ZeroTravelers);
    }
    Ok(amount / f64::from(travelers))
}

/// Whole days from `email_ts` to `departure_ts`, floored.
///
/// Negative values mean the email arrived after departure; they are returned
/// as-is and must be filtered by the caller.
pub fn lead_time_days(departure_ts: NaiveDateTime, email_ts: NaiveDateTime) -> i64 {
    let delta = departure_ts - email_ts;
    delta.num_seconds().div_euclid(86_400)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CabinClass {
    Economy,
    MainCabin,
    PremiumEconomy,
    BusinessFirst,
    Other,
}

impl CabinClass {
    pub fn label(&self) -> &'static str {
        match self {
            CabinClass::Economy => "Economy",
            CabinClass::MainCabin => "Main Cabin",
            CabinClass::PremiumEconomy => "Premium Economy",
            CabinClass::BusinessFirst => "Business/First Class",
            CabinClass::Other => "Other",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Buckets a free-text cabin label. Rules are tested in order and the first
/// match wins, so "premium economy" lands in `Economy`.
pub fn normalize_cabin(label: &str) -> CabinClass {
    let lowered = label.to_lowercase();
    if lowered.contains("basic") || lowered.contains("economy") {
        CabinClass::Economy
    } else if lowered.contains("main") {
        CabinClass::MainCabin
    } else if lowered.contains("premium") {
        CabinClass::PremiumEconomy
    } else if lowered.contains("business") || lowered.contains("first") {
        CabinClass::BusinessFirst
    } else {
        CabinClass::Other
    }
}
