// Aircraft records and the flight lifecycle
//
// A record lives for the whole process. Flights come and go on it:
// NoFlight -> ActiveFlight on the first sample, back to NoFlight through
// `finalize` when the flight ends (END sentinel or connection loss).

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::fuel::{self, FuelStats};

/// Aircraft identifier as sent on the wire.
pub type AircraftId = i64;

/// One `(timestamp, fuel remaining)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Seconds (epoch or elapsed, depending on the producer).
    pub timestamp: f64,
    pub fuel_remaining: f64,
}

impl Sample {
    pub fn new(timestamp: f64, fuel_remaining: f64) -> Self {
        Sample {
            timestamp,
            fuel_remaining,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightState {
    NoFlight,
    ActiveFlight,
}

/// What ended a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightEnd {
    /// The producer sent the END sentinel.
    Sentinel,
    /// The connection that carried the flight closed or failed.
    Disconnect,
}

impl fmt::Display for FlightEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightEnd::Sentinel => write!(f, "END received"),
            FlightEnd::Disconnect => write!(f, "connection closed"),
        }
    }
}

/// Everything the history writer needs about a finished flight.
///
/// Taken as an owned snapshot so it can be persisted after the store lock
/// is released.
#[derive(Debug, Clone)]
pub struct FlightSummary {
    pub id: AircraftId,
    pub reason: FlightEnd,
    pub ended_at: DateTime<Local>,
    pub stats: FuelStats,
    /// Samples of the flight, in timestamp order.
    pub samples: Vec<Sample>,
}

/// Live state for one aircraft.
#[derive(Debug, Clone)]
pub struct AircraftRecord {
    id: AircraftId,
    samples: Vec<Sample>,
    stats: FuelStats,
    active_flight: bool,
}

impl AircraftRecord {
    /// Fresh record with zeroed aggregates and no flight.
    pub fn new(id: AircraftId) -> Self {
        AircraftRecord {
            id,
            samples: Vec::new(),
            stats: FuelStats::default(),
            active_flight: false,
        }
    }

    pub fn id(&self) -> AircraftId {
        self.id
    }

    /// Samples of the current flight, in arrival order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn stats(&self) -> FuelStats {
        self.stats
    }

    pub fn is_active(&self) -> bool {
        self.active_flight
    }

    pub fn state(&self) -> FlightState {
        if self.active_flight {
            FlightState::ActiveFlight
        } else {
            FlightState::NoFlight
        }
    }

    /// Record a sample, starting a new flight if none is active.
    /// Returns `true` when this sample opened a flight.
    pub fn append_sample(&mut self, sample: Sample) -> bool {
        let new_flight = !self.active_flight;
        if new_flight {
            // Aggregates of the previous flight must not bleed into this one.
            self.samples.clear();
            self.stats = FuelStats::default();
            self.active_flight = true;
        }
        self.samples.push(sample);
        new_flight
    }

    /// Rebuild aggregates from the current sample set.
    pub fn recompute(&mut self) {
        self.stats = fuel::recompute(&self.samples, self.stats);
    }

    /// End the current flight: recompute once more, snapshot it, then clear
    /// the samples and drop back to `NoFlight`. Aggregates stay readable
    /// until the next flight starts. Finalizing with no active flight
    /// reports an empty flight with zero aggregates.
    pub fn finalize(&mut self, reason: FlightEnd) -> FlightSummary {
        if !self.active_flight {
            self.samples.clear();
            self.stats = FuelStats::default();
        }
        self.recompute();
        let summary = FlightSummary {
            id: self.id,
            reason,
            ended_at: Local::now(),
            stats: self.stats,
            samples: fuel::chronological(&self.samples),
        };
        self.samples.clear();
        self.active_flight = false;
        summary
    }
}
