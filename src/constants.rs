// Shared constants for the telemetry protocol and history artifacts

/// Default TCP port the producer connects to.
pub const DEFAULT_PORT: u16 = 27015;

/// Field delimiter within one telemetry record.
pub const FIELD_DELIMITER: char = ',';

/// Record delimiter on the wire.
pub const RECORD_DELIMITER: u8 = b'\n';

/// Time-field value marking end of flight.
pub const END_SENTINEL: &str = "END";

/// Calendar encoding of the time field (`MM_DD_YYYY HH:MM:SS`).
pub const CALENDAR_TIME_FORMAT: &str = "%m_%d_%Y %H:%M:%S";

/// Size of a single socket read.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Separator between the flight summary and the sample list in a history artifact.
pub const HISTORY_SEPARATOR: &str = "-----------------------------";

/// `ctime`-style timestamp written at the top of every history block.
pub const HISTORY_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Snapshot file written to the work directory by the status reporter.
pub const SNAPSHOT_FILE: &str = "aircraft.json";
