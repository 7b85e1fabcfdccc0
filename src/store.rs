// Aircraft store
// Shared map of aircraft id -> record, guarded by a single store-wide lock

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::aircraft::{AircraftId, AircraftRecord, FlightEnd, FlightSummary, Sample};
use crate::fuel::FuelStats;

/// Result of recording one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleUpdate {
    pub id: AircraftId,
    /// The record did not exist before this sample.
    pub new_aircraft: bool,
    /// This sample opened a new flight on the record.
    pub new_flight: bool,
    pub sample_count: usize,
    pub stats: FuelStats,
}

/// Per-aircraft row of the status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftStatus {
    pub id: AircraftId,
    pub active_flight: bool,
    pub samples: usize,
    #[serde(flatten)]
    pub stats: FuelStats,
}

/// Concurrency-safe aircraft store.
///
/// Every operation takes the one lock for its whole read-modify-write, so
/// creation is atomic and no two operations on the same id interleave.
/// Callers own the store (usually behind an `Arc`) and hand it to each
/// connection handler.
#[derive(Debug, Default)]
pub struct AircraftStore {
    records: Mutex<HashMap<AircraftId, AircraftRecord>>,
}

impl AircraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `id`, creating a zeroed record if it is missing.
    /// Returns a copy of the record as it stands.
    pub async fn get_or_create(&self, id: AircraftId) -> AircraftRecord {
        let mut records = self.records.lock().await;
        let (record, _) = entry(&mut records, id);
        record.clone()
    }

    /// Append a sample to `id`'s current flight and recompute its aggregates.
    pub async fn record_sample(&self, id: AircraftId, sample: Sample) -> SampleUpdate {
        let mut records = self.records.lock().await;
        let (record, new_aircraft) = entry(&mut records, id);
        let new_flight = record.append_sample(sample);
        record.recompute();
        SampleUpdate {
            id,
            new_aircraft,
            new_flight,
            sample_count: record.samples().len(),
            stats: record.stats(),
        }
    }

    /// Finalize `id`'s flight after an END sentinel.
    ///
    /// Always produces a summary, even for an id with no samples (or no
    /// record yet), so a persistence attempt is made for every END.
    pub async fn end_flight(&self, id: AircraftId) -> FlightSummary {
        let mut records = self.records.lock().await;
        let (record, _) = entry(&mut records, id);
        record.finalize(FlightEnd::Sentinel)
    }

    /// Finalize `id`'s flight after its connection went away, but only if the
    /// flight is still active. A flight already closed by END yields `None`.
    pub async fn end_active_flight(&self, id: AircraftId) -> Option<FlightSummary> {
        let mut records = self.records.lock().await;
        match records.get_mut(&id) {
            Some(record) if record.is_active() => Some(record.finalize(FlightEnd::Disconnect)),
            _ => {
                debug!(id, "No active flight to finalize");
                None
            }
        }
    }

    /// Copy of the record for `id`, if any.
    pub async fn get(&self, id: AircraftId) -> Option<AircraftRecord> {
        self.records.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Point-in-time view of every record, ordered by id.
    pub async fn snapshot(&self) -> Vec<AircraftStatus> {
        let mut rows: Vec<AircraftStatus> = {
            let records = self.records.lock().await;
            records
                .values()
                .map(|r| AircraftStatus {
                    id: r.id(),
                    active_flight: r.is_active(),
                    samples: r.samples().len(),
                    stats: r.stats(),
                })
                .collect()
        };
        rows.sort_by_key(|row| row.id);
        rows
    }
}

/// Find-or-insert under an already held lock. The flag is `true` when the
/// record was created by this call.
fn entry(
    records: &mut HashMap<AircraftId, AircraftRecord>,
    id: AircraftId,
) -> (&mut AircraftRecord, bool) {
    let mut created = false;
    let record = records.entry(id).or_insert_with(|| {
        created = true;
        AircraftRecord::new(id)
    });
    (record, created)
}
