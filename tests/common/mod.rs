#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use fare_insights::loader::{Booking, BookingTable};
use tempfile::{TempDir, tempdir};

pub const HEADER: &str = "F_DEPARTURE_CITY,F_ARRIVAL_CITY,F_DEPARTURE_TIME,F_TRAVELER_COUNT,P_ORDER_TOTAL_AMOUNT,F_CABIN_CLASS,F_USER_ID,F_EMAIL_TIME,F_MERCHANT_NAME";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a booking CSV with the default header followed by `rows`.
    pub fn write_bookings(&self, name: &str, rows: &[&str]) -> PathBuf {
        let mut contents = String::from(HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        self.write(name, &contents)
    }
}

pub fn at(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .expect("fixture date")
        .and_hms_opt(0, 0, 0)
        .expect("midnight")
}

/// Booking builder with sensible defaults; override fields as needed.
pub fn booking(from: &str, to: &str, amount: f64, travelers: i16) -> Booking {
    Booking {
        departure_city: from.to_string(),
        arrival_city: to.to_string(),
        departure_time: at("2023-03-15"),
        email_time: at("2023-03-01"),
        traveler_count: travelers,
        order_total_amount: amount,
        cabin_class: "Economy".to_string(),
        user_id: "u1".to_string(),
        merchant_name: "Delta".to_string(),
    }
}

pub fn table(bookings: Vec<Booking>) -> BookingTable {
    BookingTable::new(bookings)
}
