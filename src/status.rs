// Periodic status reporting
// Logs a one-line store summary and optionally rewrites aircraft.json in the work dir

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::constants::SNAPSHOT_FILE;
use crate::store::{AircraftStatus, AircraftStore};

pub struct StatusReporter {
    store: Arc<AircraftStore>,
    interval: Option<Duration>,
    work_dir: Option<PathBuf>,
}

impl StatusReporter {
    /// `interval_secs <= 0` disables the status line; the snapshot is only
    /// written when `work_dir` is set.
    pub fn new(store: Arc<AircraftStore>, interval_secs: i32, work_dir: Option<PathBuf>) -> Self {
        let interval = u64::try_from(interval_secs)
            .ok()
            .filter(|&s| s > 0)
            .map(Duration::from_secs);
        StatusReporter {
            store,
            interval,
            work_dir,
        }
    }

    /// Status line: `Status: (N aircraft, M active flights, K buffered samples)`.
    pub fn status_line(rows: &[AircraftStatus]) -> String {
        let active = rows.iter().filter(|r| r.active_flight).count();
        let samples: usize = rows.iter().map(|r| r.samples).sum();
        format!(
            "Status: ({} aircraft, {} active flights, {} buffered samples)",
            rows.len(),
            active,
            samples
        )
    }

    /// Run forever. Returns immediately if neither the status line nor the
    /// snapshot is enabled.
    pub async fn run(self) {
        if self.interval.is_none() && self.work_dir.is_none() {
            return;
        }
        if let Some(dir) = &self.work_dir {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                warn!("Failed to create work_dir {}: {}", dir.display(), e);
            }
        }

        let period = self.interval.unwrap_or(Duration::from_secs(5));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let rows = self.store.snapshot().await;
            if self.interval.is_some() {
                info!("{}", Self::status_line(&rows));
            }
            if let Some(dir) = &self.work_dir {
                write_snapshot(dir, &rows).await;
            }
        }
    }
}

/// Write `rows` to `<dir>/aircraft.json` via a temp file and rename.
pub async fn write_snapshot(dir: &Path, rows: &[AircraftStatus]) {
    let path = dir.join(SNAPSHOT_FILE);
    let tmp = dir.join(format!("{}.tmp", SNAPSHOT_FILE));

    let json = match serde_json::to_string(rows) {
        Ok(s) => s,
        Err(e) => {
            warn!("snapshot: failed to serialize: {}", e);
            return;
        }
    };
    if let Err(e) = tokio::fs::write(&tmp, json).await {
        warn!("snapshot: failed to write {}: {}", tmp.display(), e);
    } else if let Err(e) = tokio::fs::rename(&tmp, &path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        warn!("snapshot: failed to rename {} -> {}: {}", tmp.display(), path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::Sample;

    #[tokio::test]
    async fn test_status_line() {
        let store = AircraftStore::new();
        store.record_sample(1, Sample::new(0.0, 100.0)).await;
        store.record_sample(1, Sample::new(10.0, 90.0)).await;
        store.record_sample(2, Sample::new(0.0, 100.0)).await;
        store.end_flight(2).await;

        let rows = store.snapshot().await;
        assert_eq!(
            StatusReporter::status_line(&rows),
            "Status: (2 aircraft, 1 active flights, 2 buffered samples)"
        );
    }

    #[test]
    fn test_interval_disabled() {
        let store = Arc::new(AircraftStore::new());
        assert!(StatusReporter::new(store.clone(), 0, None).interval.is_none());
        assert!(StatusReporter::new(store.clone(), -1, None).interval.is_none());
        assert_eq!(
            StatusReporter::new(store, 15, None).interval,
            Some(Duration::from_secs(15))
        );
    }

    #[tokio::test]
    async fn test_write_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = AircraftStore::new();
        store.record_sample(7, Sample::new(0.0, 100.0)).await;
        store.record_sample(7, Sample::new(10.0, 80.0)).await;

        write_snapshot(dir.path(), &store.snapshot().await).await;

        let text = std::fs::read_to_string(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["active_flight"], true);
        assert_eq!(value[0]["samples"], 2);
        assert_eq!(value[0]["avg_fuel_consumption"], 2.0);
        assert!(!dir.path().join("aircraft.json.tmp").exists());
    }
}
