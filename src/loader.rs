//! Loader/Validator stage.
//!
//! Reads a booking file, coerces each declared column once, drops rows with a
//! null in any required field and finally drops rows whose order amount or
//! traveler count is not positive. The result is a [`BookingTable`] whose
//! rows are all complete and safe to divide by traveler count.

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::{NullTokens, Value, parse_typed_value},
    derive::{self, CabinClass},
    error::PipelineResult,
    io_utils,
    schema::{BookingField, ResolvedSchema, Schema},
};

/// One coerced row, in resolved-schema column order.
pub type TypedRow = Vec<Option<Value>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: NaiveDateTime,
    pub email_time: NaiveDateTime,
    pub traveler_count: i16,
    pub order_total_amount: f64,
    pub cabin_class: String,
    pub user_id: String,
    pub merchant_name: String,
}

impl Booking {
    pub fn route(&self) -> String {
        derive::route(&self.departure_city, &self.arrival_city)
    }

    pub fn price_per_traveler(&self) -> PipelineResult<f64> {
        derive::price_per_traveler(self.order_total_amount, self.traveler_count)
    }

    pub fn lead_time_days(&self) -> i64 {
        derive::lead_time_days(self.departure_time, self.email_time)
    }

    pub fn cabin_group(&self) -> CabinClass {
        derive::normalize_cabin(&self.cabin_class)
    }

    /// True for either direction of the `a`/`b` city pair.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.departure_city == a && self.arrival_city == b)
            || (self.departure_city == b && self.arrival_city == a)
    }

    fn from_typed(schema: &ResolvedSchema, row: &TypedRow) -> Option<Self> {
        let cell = |field: BookingField| schema.position(field).and_then(|idx| row.get(idx)?.as_ref());
        let text = |field: BookingField| cell(field).and_then(Value::as_text).map(str::to_string);
        let timestamp = |field: BookingField| cell(field).and_then(Value::as_datetime);
        Some(Booking {
            departure_city: text(BookingField::DepartureCity)?,
            arrival_city: text(BookingField::ArrivalCity)?,
            departure_time: timestamp(BookingField::DepartureTime)?,
            email_time: timestamp(BookingField::EmailTime)?,
            traveler_count: cell(BookingField::TravelerCount).and_then(Value::as_small_int)?,
            order_total_amount: cell(BookingField::OrderTotalAmount).and_then(Value::as_decimal)?,
            cabin_class: text(BookingField::CabinClass)?,
            user_id: text(BookingField::UserId)?,
            merchant_name: text(BookingField::MerchantName)?,
        })
    }
}

/// Immutable, validated booking table shared by every analytical question.
#[derive(Debug, Clone, Default)]
pub struct BookingTable {
    bookings: Vec<Booking>,
}

impl BookingTable {
    /// Builds a table, discarding bookings with a non-positive amount or
    /// traveler count.
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: retain_positive(bookings),
        }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Booking> {
        self.bookings.iter()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Returns a new table holding the bookings that satisfy `predicate`.
    pub fn filter<F>(&self, predicate: F) -> BookingTable
    where
        F: Fn(&Booking) -> bool,
    {
        BookingTable {
            bookings: self.bookings.iter().filter(|b| predicate(b)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BookingTable {
    type Item = &'a Booking;
    type IntoIter = std::slice::Iter<'a, Booking>;

    fn into_iter(self) -> Self::IntoIter {
        self.bookings.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub incomplete_dropped: usize,
    pub non_positive_dropped: usize,
    pub rows_kept: usize,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub null_tokens: NullTokens,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            null_tokens: NullTokens::default(),
        }
    }
}

pub fn load_bookings(
    path: &Path,
    schema: &Schema,
    options: &LoadOptions,
) -> Result<(BookingTable, LoadReport)> {
    info!("Loading bookings from '{}'", path.display());
    let reader = io_utils::open_csv_reader_from_path(path, options.delimiter)?;
    load_from_csv(reader, schema, options).with_context(|| format!("Loading bookings from {path:?}"))
}

pub fn load_from_reader<R>(
    reader: R,
    schema: &Schema,
    options: &LoadOptions,
) -> PipelineResult<(BookingTable, LoadReport)>
where
    R: Read,
{
    load_from_csv(io_utils::open_csv_reader(reader, options.delimiter), schema, options)
}

fn load_from_csv<R>(
    mut reader: csv::Reader<R>,
    schema: &Schema,
    options: &LoadOptions,
) -> PipelineResult<(BookingTable, LoadReport)>
where
    R: Read,
{
    schema.validate()?;
    let headers = io_utils::reader_headers(&mut reader, options.encoding)?;
    let resolved = schema.resolve(&headers)?;
    debug!("Resolved {} declared column(s)", resolved.columns.len());

    let mut typed_rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record?;
        let decoded = io_utils::decode_record(&record, options.encoding)?;
        typed_rows.push(parse_typed_row(&resolved, &decoded, &options.null_tokens, row_idx + 2)?);
    }
    let rows_read = typed_rows.len();

    let bookings = filter_complete(typed_rows)
        .iter()
        .filter_map(|row| Booking::from_typed(&resolved, row))
        .collect::<Vec<_>>();
    // every row that did not become a booking is counted as incomplete
    let incomplete_dropped = rows_read - bookings.len();
    let complete_count = bookings.len();

    let table = BookingTable::new(bookings);
    let report = LoadReport {
        rows_read,
        incomplete_dropped,
        non_positive_dropped: complete_count - table.len(),
        rows_kept: table.len(),
    };
    info!(
        "Read {} row(s); dropped {} incomplete and {} non-positive; kept {}",
        report.rows_read, report.incomplete_dropped, report.non_positive_dropped, report.rows_kept
    );
    Ok((table, report))
}

pub fn parse_typed_row(
    schema: &ResolvedSchema,
    raw: &[String],
    nulls: &NullTokens,
    row_number: usize,
) -> PipelineResult<TypedRow> {
    schema
        .columns
        .iter()
        .map(|column| {
            let value = raw.get(column.source_index).map(|s| s.as_str()).unwrap_or("");
            parse_typed_value(value, column.spec.datatype, nulls, &column.spec.name, row_number)
        })
        .collect()
}

/// Keeps rows with no null cell. Applying it twice changes nothing.
pub fn filter_complete(rows: Vec<TypedRow>) -> Vec<TypedRow> {
    rows.into_iter()
        .filter(|row| row.iter().all(Option::is_some))
        .collect()
}

pub fn retain_positive(bookings: Vec<Booking>) -> Vec<Booking> {
    bookings
        .into_iter()
        .filter(|b| b.order_total_amount > 0.0 && b.traveler_count > 0)
        .collect()
}
