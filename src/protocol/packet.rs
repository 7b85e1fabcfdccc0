// Packet parser
// Turns one decoded record into a typed sample or an end-of-flight marker

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::aircraft::{AircraftId, Sample};
use crate::constants::{CALENDAR_TIME_FORMAT, END_SENTINEL, FIELD_DELIMITER};
use crate::error::ParseError;

/// A parsed telemetry record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Packet {
    /// One fuel observation for an aircraft.
    Sample { id: AircraftId, sample: Sample },
    /// End-of-flight sentinel for an aircraft.
    End { id: AircraftId },
}

impl Packet {
    pub fn aircraft_id(&self) -> AircraftId {
        match self {
            Packet::Sample { id, .. } | Packet::End { id } => *id,
        }
    }
}

/// Parse one record: `<id>,<time>,<fuel>` or `<id>,END[,<ignored>]`.
pub fn parse_packet(line: &str) -> Result<Packet, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if fields.len() < 2 || fields.len() > 3 {
        return Err(ParseError::FieldCount { found: fields.len() });
    }

    let id = fields[0]
        .parse::<AircraftId>()
        .map_err(|source| ParseError::AircraftId {
            value: fields[0].to_string(),
            source,
        })?;

    if fields[1] == END_SENTINEL {
        return Ok(Packet::End { id });
    }

    if fields.len() != 3 {
        return Err(ParseError::FieldCount { found: fields.len() });
    }

    let timestamp = parse_time_field(fields[1])?;
    let fuel_remaining = parse_fuel_field(fields[2])?;

    Ok(Packet::Sample {
        id,
        sample: Sample::new(timestamp, fuel_remaining),
    })
}

/// Parse a time field into seconds.
///
/// The calendar encoding `MM_DD_YYYY HH:MM:SS` is tried first and read as
/// server-local time; anything else must be a finite number (epoch or
/// elapsed seconds).
pub fn parse_time_field(value: &str) -> Result<f64, ParseError> {
    let value = value.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, CALENDAR_TIME_FORMAT) {
        return Ok(local_epoch_seconds(&naive) as f64);
    }

    match value.parse::<f64>() {
        Ok(t) if t.is_finite() => Ok(t),
        _ => Err(ParseError::Time {
            value: value.to_string(),
        }),
    }
}

fn parse_fuel_field(value: &str) -> Result<f64, ParseError> {
    let fuel = value.parse::<f64>().map_err(|source| ParseError::Fuel {
        value: value.to_string(),
        source,
    })?;
    if !fuel.is_finite() {
        return Err(ParseError::NonFinite {
            field: "fuel",
            value: value.to_string(),
        });
    }
    Ok(fuel)
}

/// Local wall-clock time to epoch seconds. Times skipped by a DST change
/// have no local meaning and are taken as UTC.
fn local_epoch_seconds(naive: &NaiveDateTime) -> i64 {
    match Local.from_local_datetime(naive).earliest() {
        Some(dt) => dt.timestamp(),
        None => naive.and_utc().timestamp(),
    }
}
