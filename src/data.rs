use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, PipelineResult},
    schema::ColumnType,
};

pub const DEFAULT_NULL_TOKENS: &[&str] = &["", "NA", "NULL", "NaN"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Text(String),
    SmallInt(i16),
    Decimal(f64),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::SmallInt(i) => i.to_string(),
            Value::Decimal(f) => {
                if f.fract() == 0.0 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_small_int(&self) -> Option<i16> {
        match self {
            Value::SmallInt(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Cell-level null detection. Tokens compare against the trimmed cell, case-sensitive,
/// so a blank cell is null only while `""` is one of the tokens.
#[derive(Debug, Clone)]
pub struct NullTokens {
    tokens: Vec<String>,
}

impl NullTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.tokens.iter().any(|token| token == trimmed)
    }
}

impl Default for NullTokens {
    fn default() -> Self {
        Self::new(DEFAULT_NULL_TOKENS.iter().copied())
    }
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Lenient date-time parsing. Returns `None` for anything unrecognised so the
/// loader can null the cell instead of failing the load.
pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    let without_zulu = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_zulu, fmt).ok())
        .or_else(|| parse_naive_date(without_zulu).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Coerces one raw cell into its declared type.
///
/// Null tokens yield `Ok(None)`. Date-time failures also yield `Ok(None)`;
/// numeric failures are fatal and carry the offending column and row.
pub fn parse_typed_value(
    value: &str,
    ty: ColumnType,
    nulls: &NullTokens,
    column: &str,
    row: usize,
) -> PipelineResult<Option<Value>> {
    if nulls.is_null(value) {
        return Ok(None);
    }
    let trimmed = value.trim();
    let coercion_error = |expected: &'static str| PipelineError::Coercion {
        column: column.to_string(),
        row,
        value: value.to_string(),
        expected,
    };
    let parsed = match ty {
        ColumnType::Text => Value::Text(trimmed.to_string()),
        ColumnType::SmallInt => {
            let parsed = parse_small_int(trimmed).ok_or_else(|| coercion_error("small integer"))?;
            Value::SmallInt(parsed)
        }
        ColumnType::Decimal => {
            let parsed: f64 = trimmed
                .parse()
                .map_err(|_| coercion_error("decimal"))?;
            if !parsed.is_finite() {
                return Err(coercion_error("decimal"));
            }
            Value::Decimal(parsed)
        }
        ColumnType::DateTime => match parse_naive_datetime(trimmed) {
            Some(parsed) => Value::DateTime(parsed),
            None => return Ok(None),
        },
    };
    Ok(Some(parsed))
}

// Accepts "3" and "3.0" but never truncates "2.5".
fn parse_small_int(value: &str) -> Option<i16> {
    if let Ok(parsed) = value.parse::<i16>() {
        return Some(parsed);
    }
    let float: f64 = value.parse().ok()?;
    if float.fract() != 0.0 || float < f64::from(i16::MIN) || float > f64::from(i16::MAX) {
        return None;
    }
    Some(float as i16)
}
