// Flight history persistence
// Appends one text block per finished flight to aircraft_<id>_history.txt

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::aircraft::{AircraftId, FlightSummary};
use crate::constants::{HISTORY_SEPARATOR, HISTORY_TIME_FORMAT};
use crate::error::PersistenceError;

/// Appends flight summaries to per-aircraft history files.
///
/// Files are opened in append mode for every flight and never truncated.
#[derive(Debug, Clone)]
pub struct HistoryWriter {
    dir: PathBuf,
}

impl HistoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HistoryWriter { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the history directory if needed. Call once at startup.
    pub async fn ensure_dir(&self) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// History file for an aircraft.
    pub fn path_for(&self, id: AircraftId) -> PathBuf {
        self.dir.join(format!("aircraft_{}_history.txt", id))
    }

    /// Append `summary` to its aircraft's history file, returning the path.
    pub async fn append(&self, summary: &FlightSummary) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(summary.id);
        let block = format_summary(summary);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| PersistenceError::Open {
                path: path.clone(),
                source,
            })?;

        let written = async {
            file.write_all(block.as_bytes()).await?;
            file.flush().await
        }
        .await;
        written.map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Render one history block.
pub fn format_summary(summary: &FlightSummary) -> String {
    let stats = &summary.stats;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Flight ended: {}", summary.ended_at.format(HISTORY_TIME_FORMAT));
    let _ = writeln!(out, "End reason: {}", summary.reason);
    let _ = writeln!(
        out,
        "Total flight time: {:.2} minutes ({} seconds)",
        stats.flight_minutes(),
        stats.total_flight_time
    );
    let _ = writeln!(out, "Total fuel consumed: {} gallons", stats.total_fuel_consumed);
    let _ = writeln!(
        out,
        "Average fuel consumption: {} gallons/second",
        stats.avg_fuel_consumption
    );
    let _ = writeln!(out, "{}", HISTORY_SEPARATOR);
    for sample in &summary.samples {
        let _ = writeln!(out, "{},{}", sample.timestamp, sample.fuel_remaining);
    }
    out.push('\n');

    out
}
