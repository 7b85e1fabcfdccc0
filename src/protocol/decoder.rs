// Stream decoder
// Reassembles newline-delimited records from arbitrary socket reads

use crate::constants::RECORD_DELIMITER;

/// Per-connection line decoder.
///
/// Bytes are fed as they arrive from the socket; complete records come out
/// with the delimiter (and a trailing `\r`, if any) stripped. Anything after
/// the last delimiter stays buffered until the next `feed`.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every record completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..]
            .iter()
            .position(|&b| b == RECORD_DELIMITER)
        {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
        }
        self.buffer.drain(..start);

        lines
    }

    /// Number of undelimited bytes currently held.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any undelimited trailing bytes (connection closed mid-record).
    /// Returns how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        discarded
    }
}
