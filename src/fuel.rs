// Fuel consumption calculator
// Aggregates are always rebuilt from the full sample set of the current flight

use serde::Serialize;

use crate::aircraft::Sample;

/// Aggregate consumption statistics for one flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FuelStats {
    /// Fuel burned between the earliest and latest sample.
    pub total_fuel_consumed: f64,
    /// Seconds between the earliest and latest sample.
    pub total_flight_time: f64,
    /// Fuel per second over the flight.
    pub avg_fuel_consumption: f64,
}

impl FuelStats {
    pub fn flight_minutes(&self) -> f64 {
        self.total_flight_time / 60.0
    }
}

/// Timestamp-ordered copy of `samples`. Ties keep arrival order.
pub fn chronological(samples: &[Sample]) -> Vec<Sample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    sorted
}

/// Recompute aggregates from the complete sample set.
///
/// The result replaces `current` outright. With fewer than two samples, or
/// when the earliest and latest samples share a timestamp, `current` is
/// returned unchanged.
pub fn recompute(samples: &[Sample], current: FuelStats) -> FuelStats {
    let sorted = chronological(samples);
    let [earliest, .., latest] = sorted.as_slice() else {
        return current;
    };

    let fuel_consumed = earliest.fuel_remaining - latest.fuel_remaining;
    let time_elapsed = latest.timestamp - earliest.timestamp;
    if time_elapsed <= 0.0 {
        return current;
    }

    FuelStats {
        total_fuel_consumed: fuel_consumed,
        total_flight_time: time_elapsed,
        avg_fuel_consumption: fuel_consumed / time_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f64)]) -> Vec<Sample> {
        points.iter().map(|&(t, f)| Sample::new(t, f)).collect()
    }

    #[test]
    fn test_two_samples() {
        let stats = recompute(&samples(&[(0.0, 100.0), (10.0, 80.0)]), FuelStats::default());
        assert_eq!(stats.total_flight_time, 10.0);
        assert_eq!(stats.total_fuel_consumed, 20.0);
        assert_eq!(stats.avg_fuel_consumption, 2.0);
    }

    #[test]
    fn test_arrival_order_does_not_matter() {
        let forward = recompute(&samples(&[(0.0, 100.0), (10.0, 80.0)]), FuelStats::default());
        let reverse = recompute(&samples(&[(10.0, 80.0), (0.0, 100.0)]), FuelStats::default());
        assert_eq!(forward, reverse);

        let shuffled = samples(&[(30.0, 40.0), (5.0, 95.0), (0.0, 100.0), (17.0, 70.0)]);
        let stats = recompute(&shuffled, FuelStats::default());
        assert_eq!(stats.total_flight_time, 30.0);
        assert_eq!(stats.total_fuel_consumed, 60.0);
        assert_eq!(stats.avg_fuel_consumption, 2.0);
    }

    #[test]
    fn test_fewer_than_two_samples_keeps_current() {
        let zero = FuelStats::default();
        assert_eq!(recompute(&[], zero), zero);
        assert_eq!(recompute(&samples(&[(5.0, 50.0)]), zero), zero);
    }

    #[test]
    fn test_degenerate_timestamps_keep_last_valid() {
        let previous = FuelStats {
            total_fuel_consumed: 20.0,
            total_flight_time: 10.0,
            avg_fuel_consumption: 2.0,
        };
        let same_time = samples(&[(5.0, 100.0), (5.0, 90.0), (5.0, 80.0)]);
        assert_eq!(recompute(&same_time, previous), previous);
    }

    #[test]
    fn test_replaces_instead_of_accumulating() {
        let mut flight = samples(&[(0.0, 100.0), (10.0, 80.0)]);
        let first = recompute(&flight, FuelStats::default());
        flight.push(Sample::new(20.0, 70.0));
        let second = recompute(&flight, first);
        assert_eq!(second.total_flight_time, 20.0);
        assert_eq!(second.total_fuel_consumed, 30.0);
        assert_eq!(second.avg_fuel_consumption, 1.5);
    }

    #[test]
    fn test_late_extreme_sample_rewrites_whole_flight() {
        let mut flight = samples(&[(10.0, 90.0), (20.0, 80.0)]);
        let before = recompute(&flight, FuelStats::default());
        assert_eq!(before.avg_fuel_consumption, 1.0);

        // Arrives last, but is the earliest observation.
        flight.push(Sample::new(0.0, 120.0));
        let after = recompute(&flight, before);
        assert_eq!(after.total_flight_time, 20.0);
        assert_eq!(after.total_fuel_consumed, 40.0);
        assert_eq!(after.avg_fuel_consumption, 2.0);
    }

    #[test]
    fn test_recompute_is_bit_identical() {
        let flight = samples(&[(0.3, 1000.7), (7.1, 993.3), (3.9, 997.1), (11.7, 988.9)]);
        let once = recompute(&flight, FuelStats::default());
        let twice = recompute(&flight, once);
        assert_eq!(once.total_fuel_consumed.to_bits(), twice.total_fuel_consumed.to_bits());
        assert_eq!(once.total_flight_time.to_bits(), twice.total_flight_time.to_bits());
        assert_eq!(once.avg_fuel_consumption.to_bits(), twice.avg_fuel_consumption.to_bits());
    }

    #[test]
    fn test_chronological_is_stable() {
        let sorted = chronological(&samples(&[(2.0, 1.0), (1.0, 2.0), (1.0, 3.0)]));
        assert_eq!(sorted, samples(&[(1.0, 2.0), (1.0, 3.0), (2.0, 1.0)]));
    }
}
