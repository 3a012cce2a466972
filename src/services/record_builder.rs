//! Turns exported workout CSV rows into [`ActivityRecord`]s.
//!
//! Field access is driven by the header row, so column order does not matter
//! and absent columns read as empty strings.

use chrono::{DateTime, FixedOffset};
use csv::StringRecord;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::activity::ActivityRecord;

/// Timestamp layout used by the exporter, e.g. `2024-01-01 08:00:00 +0100`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";
pub const ACTIVITY_TYPE: &str = "activityType";

/// Optional exporter columns and the attribute key each one is stored under.
pub const ATTRIBUTE_COLUMNS: &[(&str, &str)] = &[
    ("productType", "product_type"),
    ("sourceName", "source_name"),
    ("sourceVersion", "source_version"),
    ("totalEnergyBurned", "total_energy_burned"),
    ("totalDistance", "total_distance"),
    ("totalFlightsClimbed", "flights_climbed"),
    ("HKTimeZone", "timezone"),
    ("HKAverageMETs", "average_mets"),
    ("HKWeatherTemperature", "weather_temp"),
    ("HKWeatherHumidity", "weather_humidity"),
];

/// Why a single row was skipped. Never fatal for the file.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}` value {value:?}: {source}")]
    InvalidDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("malformed row: {0}")]
    Malformed(#[from] csv::Error),
}

/// Problems with the export as a whole. These fail the file.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("export has no header row")]
    MissingHeader,
}

/// One data row viewed through the file's header.
pub struct RawRow<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    pub fn new(headers: &'a StringRecord, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Value of the named column, or `""` when the column or the cell is missing.
    pub fn field(&self, name: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| self.record.get(idx))
            .unwrap_or("")
    }
}

fn required<'a>(row: &RawRow<'a>, name: &'static str) -> Result<&'a str, RowError> {
    match row.field(name) {
        "" => Err(RowError::MissingField(name)),
        value => Ok(value),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<DateTime<FixedOffset>, RowError> {
    DateTime::parse_from_str(value, DATE_FORMAT).map_err(|source| RowError::InvalidDate {
        field,
        value: value.to_string(),
        source,
    })
}

/// Build one record. Only `startDate` and `endDate` can make a row fail.
pub fn build_record(row: &RawRow<'_>) -> Result<ActivityRecord, RowError> {
    let start_raw = required(row, START_DATE)?;
    let end_raw = required(row, END_DATE)?;
    let start_time = parse_date(START_DATE, start_raw)?;
    let end_time = parse_date(END_DATE, end_raw)?;

    let attributes: BTreeMap<String, String> = ATTRIBUTE_COLUMNS
        .iter()
        .map(|(column, key)| (key.to_string(), row.field(column).to_string()))
        .collect();

    Ok(ActivityRecord::new(
        row.field(ACTIVITY_TYPE).to_string(),
        start_raw.to_string(),
        end_raw.to_string(),
        start_time,
        end_time,
        attributes,
    ))
}

/// Parse a whole export. The first physical line is a banner and is dropped,
/// the next line is the header. Structural problems with the header are
/// returned as `Err`; each data row gets its own `Result`.
pub fn parse_export(
    contents: &[u8],
) -> Result<Vec<Result<ActivityRecord, RowError>>, ExportError> {
    let body = match contents.iter().position(|&b| b == b'\n') {
        Some(idx) => &contents[idx + 1..],
        None => &[][..],
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ExportError::MissingHeader);
    }

    let rows = reader
        .records()
        .map(|record| {
            let record = record?;
            build_record(&RawRow::new(&headers, &record))
        })
        .collect();

    Ok(rows)
}
