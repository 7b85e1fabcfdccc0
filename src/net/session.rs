// Telemetry session handler
// Runs one producer connection: decode -> parse -> store -> finalize -> persist

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::connection::Connection;
use crate::aircraft::{AircraftId, FlightSummary};
use crate::error::ParseError;
use crate::history::HistoryWriter;
use crate::protocol::{parse_packet, LineDecoder, Packet};
use crate::store::AircraftStore;

/// Shared services handed to every connection: the aircraft store and the
/// history writer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    store: Arc<AircraftStore>,
    history: Arc<HistoryWriter>,
}

impl ConnectionHandler {
    pub fn new(store: Arc<AircraftStore>, history: Arc<HistoryWriter>) -> Self {
        ConnectionHandler { store, history }
    }

    pub fn store(&self) -> &Arc<AircraftStore> {
        &self.store
    }

    pub fn history(&self) -> &Arc<HistoryWriter> {
        &self.history
    }

    /// Serve one connection until the peer closes it or it fails.
    pub async fn handle(&self, connection: Connection) {
        let peer = connection.peer_addr();
        info!(%peer, "Producer connected");

        let mut session = TelemetrySession::new(connection, self.clone());
        match session.run().await {
            Ok(()) => info!(
                %peer,
                records = session.records,
                dropped = session.dropped,
                "Producer disconnected"
            ),
            Err(e) => warn!(
                %peer,
                records = session.records,
                dropped = session.dropped,
                "Connection error: {}",
                e
            ),
        }
    }

    /// Write a finished flight to its history file. Called with the store
    /// lock released; failures are logged and the flight's trace is lost.
    pub async fn persist(&self, summary: &FlightSummary) {
        match self.history.append(summary).await {
            Ok(path) => info!(
                id = summary.id,
                path = %path.display(),
                minutes = summary.stats.flight_minutes(),
                fuel = summary.stats.total_fuel_consumed,
                avg = summary.stats.avg_fuel_consumption,
                "Result saved"
            ),
            Err(e) => error!(id = summary.id, "Flight history not saved: {}", e),
        }
    }
}

/// Per-connection state: the partial-line buffer and the aircraft whose
/// flight this connection still owns.
pub struct TelemetrySession {
    connection: Connection,
    decoder: LineDecoder,
    last_aircraft: Option<AircraftId>,
    handler: ConnectionHandler,
    records: usize,
    dropped: usize,
}

impl TelemetrySession {
    pub fn new(connection: Connection, handler: ConnectionHandler) -> Self {
        TelemetrySession {
            connection,
            decoder: LineDecoder::new(),
            last_aircraft: None,
            handler,
            records: 0,
            dropped: 0,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.connection.peer_addr()
    }

    /// Read and process records until EOF or a transport error. Whichever
    /// way the loop ends, an active flight for the last-seen aircraft is
    /// finalized before returning.
    pub async fn run(&mut self) -> io::Result<()> {
        let result = loop {
            let lines = match self.connection.read_chunk().await {
                Ok(chunk) if chunk.is_empty() => break Ok(()),
                Ok(chunk) => self.decoder.feed(chunk),
                Err(e) => break Err(e),
            };
            for line in lines {
                self.handle_line(&line).await;
            }
        };

        let discarded = self.decoder.finish();
        if discarded > 0 {
            debug!(peer = %self.peer_addr(), discarded, "Discarding partial record");
        }

        self.finalize_on_disconnect().await;
        result
    }

    /// Process one decoded record. Malformed records are logged and dropped.
    pub async fn handle_line(&mut self, line: &str) {
        let packet = match parse_packet(line) {
            Ok(p) => p,
            Err(ParseError::Empty) => return,
            Err(e) => {
                self.dropped += 1;
                warn!(peer = %self.peer_addr(), record = line, "Dropping record: {}", e);
                return;
            }
        };

        self.records += 1;
        self.last_aircraft = Some(packet.aircraft_id());

        match packet {
            Packet::Sample { id, sample } => {
                let update = self.handler.store.record_sample(id, sample).await;
                if update.new_aircraft {
                    info!(id, "New aircraft connected");
                }
                if update.new_flight {
                    info!(id, "Flight started");
                }
                debug!(
                    id,
                    time = sample.timestamp,
                    fuel = sample.fuel_remaining,
                    avg = update.stats.avg_fuel_consumption,
                    "Sample recorded"
                );
            }
            Packet::End { id } => {
                let summary = self.handler.store.end_flight(id).await;
                info!(id, reason = %summary.reason, samples = summary.samples.len(), "Flight ended");
                // The flight is over; closing this connection must not touch
                // a later flight for the same aircraft.
                if self.last_aircraft == Some(id) {
                    self.last_aircraft = None;
                }
                self.handler.persist(&summary).await;
            }
        }
    }

    async fn finalize_on_disconnect(&mut self) {
        let Some(id) = self.last_aircraft else {
            return;
        };
        if let Some(summary) = self.handler.store.end_active_flight(id).await {
            info!(id, reason = %summary.reason, samples = summary.samples.len(), "Flight ended");
            self.handler.persist(&summary).await;
        }
    }
}
