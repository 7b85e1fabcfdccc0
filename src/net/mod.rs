// Network layer module
// Accepts producer connections and runs one telemetry session per connection

pub mod connection;
pub mod dispatch;
pub mod listener;
pub mod session;

pub use connection::Connection;
pub use dispatch::{Dispatcher, SpawnDispatcher, WorkerPool};
pub use listener::TcpServer;
pub use session::{ConnectionHandler, TelemetrySession};
