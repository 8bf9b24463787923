//! Declared input schema for booking files.
//!
//! A [`Schema`] lists the nine booking fields, the source header each one is
//! read from and the type its cells are coerced to. Only declared columns are
//! read; extra columns in the file are ignored. Schemas persist as YAML so a
//! file with different header names can be described without code changes.

use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    SmallInt,
    Decimal,
    DateTime,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::SmallInt => "small-integer",
            ColumnType::Decimal => "decimal",
            ColumnType::DateTime => "date-time",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "text" | "string" => Ok(ColumnType::Text),
            "small-integer" | "smallint" | "int16" | "integer" => Ok(ColumnType::SmallInt),
            "decimal" | "float" | "float32" => Ok(ColumnType::Decimal),
            "date-time" | "datetime" => Ok(ColumnType::DateTime),
            _ => Err(PipelineError::UnknownColumnType(value.to_string())),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The nine fields every booking must carry after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    DepartureCity,
    ArrivalCity,
    DepartureTime,
    TravelerCount,
    OrderTotalAmount,
    CabinClass,
    UserId,
    EmailTime,
    MerchantName,
}

impl BookingField {
    pub const ALL: [BookingField; 9] = [
        BookingField::DepartureCity,
        BookingField::ArrivalCity,
        BookingField::DepartureTime,
        BookingField::TravelerCount,
        BookingField::OrderTotalAmount,
        BookingField::CabinClass,
        BookingField::UserId,
        BookingField::EmailTime,
        BookingField::MerchantName,
    ];

    pub fn default_header(&self) -> &'static str {
        match self {
            BookingField::DepartureCity => "F_DEPARTURE_CITY",
            BookingField::ArrivalCity => "F_ARRIVAL_CITY",
            BookingField::DepartureTime => "F_DEPARTURE_TIME",
            BookingField::TravelerCount => "F_TRAVELER_COUNT",
            BookingField::OrderTotalAmount => "P_ORDER_TOTAL_AMOUNT",
            BookingField::CabinClass => "F_CABIN_CLASS",
            BookingField::UserId => "F_USER_ID",
            BookingField::EmailTime => "F_EMAIL_TIME",
            BookingField::MerchantName => "F_MERCHANT_NAME",
        }
    }

    pub fn default_type(&self) -> ColumnType {
        match self {
            BookingField::DepartureTime | BookingField::EmailTime => ColumnType::DateTime,
            BookingField::TravelerCount => ColumnType::SmallInt,
            BookingField::OrderTotalAmount => ColumnType::Decimal,
            _ => ColumnType::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: BookingField,
    pub name: String,
    pub datatype: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<ColumnSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        let columns = BookingField::ALL
            .iter()
            .map(|field| ColumnSpec {
                field: *field,
                name: field.default_header().to_string(),
                datatype: field.default_type(),
            })
            .collect();
        Schema { columns }
    }
}

impl Schema {
    pub fn column(&self, field: BookingField) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Maps every declared column onto its position in `headers`.
    ///
    /// Header matching trims whitespace and a leading BOM but is otherwise exact.
    pub fn resolve(&self, headers: &[String]) -> PipelineResult<ResolvedSchema> {
        let positions = self
            .columns
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|header| header.trim().trim_start_matches('\u{feff}') == column.name)
                    .map(|idx| ResolvedColumn {
                        spec: column.clone(),
                        source_index: idx,
                    })
                    .ok_or_else(|| PipelineError::MissingColumn {
                        column: column.name.clone(),
                    })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(ResolvedSchema { columns: positions })
    }

    /// Checks that every field keeps the type its booking attribute is read as.
    pub fn validate(&self) -> PipelineResult<()> {
        for column in &self.columns {
            let expected = column.field.default_type();
            if column.datatype != expected {
                return Err(PipelineError::FieldType {
                    column: column.name.clone(),
                    expected: expected.as_str(),
                    found: column.datatype.as_str(),
                });
            }
        }
        Ok(())
    }

    /// Fills in any of the nine fields a partial schema file leaves out.
    pub fn with_defaults(mut self) -> Self {
        for field in BookingField::ALL {
            if self.column(field).is_none() {
                self.columns.push(ColumnSpec {
                    field,
                    name: field.default_header().to_string(),
                    datatype: field.default_type(),
                });
            }
        }
        self
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML string")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        Ok(schema.with_defaults())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub spec: ColumnSpec,
    pub source_index: usize,
}

#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub columns: Vec<ResolvedColumn>,
}

impl ResolvedSchema {
    pub fn position(&self, field: BookingField) -> Option<usize> {
        self.columns.iter().position(|c| c.spec.field == field)
    }
}
