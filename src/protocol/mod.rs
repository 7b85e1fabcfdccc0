// Telemetry wire protocol
// Newline-delimited text records: `<id>,<time>,<fuel>` or `<id>,END`

pub mod decoder;
pub mod packet;

pub use decoder::LineDecoder;
pub use packet::{parse_packet, parse_time_field, Packet};
