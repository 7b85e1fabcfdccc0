// Error types for record parsing and history persistence
// Transport failures stay as std::io::Error in the network layer.

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use thiserror::Error;

/// Why a single telemetry record was rejected.
///
/// None of these are fatal to the connection: the caller drops the record,
/// logs it and keeps reading.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Blank line (usually a stray `\r\n`).
    #[error("empty record")]
    Empty,

    #[error("expected 3 fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid aircraft id '{value}': {source}")]
    AircraftId {
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// Neither the calendar encoding nor a finite number.
    #[error("unrecognized time field '{value}'")]
    Time { value: String },

    #[error("invalid fuel value '{value}': {source}")]
    Fuel {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    /// Parsed as a float, but NaN or infinite.
    #[error("non-finite {field} value '{value}'")]
    NonFinite { field: &'static str, value: String },
}

/// Failure to append a flight summary to its history artifact.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create history directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
