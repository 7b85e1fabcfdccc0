// Fuel Telemetry Server - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use fuel_server::config::{Config, DispatchMode};
use fuel_server::history::HistoryWriter;
use fuel_server::net::{ConnectionHandler, Dispatcher, SpawnDispatcher, TcpServer, WorkerPool};
use fuel_server::status::StatusReporter;
use fuel_server::store::AircraftStore;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    info!("Starting fuel telemetry server");

    let history = Arc::new(HistoryWriter::new(config.history_dir.clone()));
    if let Err(e) = history.ensure_dir().await {
        // Not fatal: each flight's persistence failure is reported on its own.
        warn!("{}", e);
    }
    info!("Flight history in {}", history.dir().display());

    let store = Arc::new(AircraftStore::new());
    let handler = ConnectionHandler::new(store.clone(), history);

    let dispatcher: Arc<dyn Dispatcher> = match config.dispatch {
        DispatchMode::Spawn => Arc::new(SpawnDispatcher::new(handler)),
        DispatchMode::Pool => {
            let pool = WorkerPool::new(usize::from(config.workers), handler);
            info!("Serving connections with {} workers", pool.workers());
            Arc::new(pool)
        }
    };

    // Failing to bind is the only fatal error
    let server = match TcpServer::start(config.listen, dispatcher).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to listen on {}: {}", config.listen, e);
            return Err(e.into());
        }
    };
    info!("Listening on {} ({:?} dispatch)", server.addr(), config.dispatch);

    let reporter = StatusReporter::new(store.clone(), config.status_interval, config.work_dir.clone());
    tokio::spawn(reporter.run());

    info!("Server ready");

    // Run until the process is told to stop; open flights are not finalized.
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, exiting");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
            return Err(err.into());
        }
    }

    info!("Server stopped. Aircraft known: {}", store.len().await);

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber
            .with_max_level(tracing::Level::DEBUG)
            .init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber
            .with_max_level(tracing::Level::INFO)
            .init();
    }
}
