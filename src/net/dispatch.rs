// Connection dispatch
// Hands accepted connections to independent handling tasks

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use super::connection::Connection;
use super::session::ConnectionHandler;

/// Where the listener sends each accepted connection.
pub trait Dispatcher: Send + Sync {
    /// Start (or queue) handling of `connection`. Must not block.
    fn submit(&self, connection: Connection);
}

/// One tokio task per connection.
#[derive(Debug, Clone)]
pub struct SpawnDispatcher {
    handler: ConnectionHandler,
}

impl SpawnDispatcher {
    pub fn new(handler: ConnectionHandler) -> Self {
        SpawnDispatcher { handler }
    }
}

impl Dispatcher for SpawnDispatcher {
    fn submit(&self, connection: Connection) {
        let handler = self.handler.clone();
        tokio::spawn(async move {
            handler.handle(connection).await;
        });
    }
}

/// Fixed set of worker tasks pulling connections from a shared queue.
///
/// The queue is unbounded; with every worker busy, new connections wait
/// (already accepted) until one frees up.
#[derive(Debug)]
pub struct WorkerPool {
    queue: mpsc::UnboundedSender<Connection>,
    workers: usize,
}

impl WorkerPool {
    /// Spawn `workers` worker tasks (at least one). Must be called from
    /// within a tokio runtime.
    pub fn new(workers: usize, handler: ConnectionHandler) -> Self {
        let workers = workers.max(1);
        let (queue, rx) = mpsc::unbounded_channel::<Connection>();
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers {
            let rx = Arc::clone(&rx);
            let handler = handler.clone();
            tokio::spawn(async move {
                loop {
                    // Only the idle worker holding the lock waits on the queue.
                    let next = rx.lock().await.recv().await;
                    match next {
                        Some(connection) => {
                            debug!(worker, peer = %connection.peer_addr(), "Worker picked up connection");
                            handler.handle(connection).await;
                        }
                        None => break,
                    }
                }
                debug!(worker, "Worker exiting");
            });
        }

        WorkerPool { queue, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Dispatcher for WorkerPool {
    fn submit(&self, connection: Connection) {
        if let Err(mpsc::error::SendError(connection)) = self.queue.send(connection) {
            // Only possible once every worker has exited.
            error!(peer = %connection.peer_addr(), "No workers left, dropping connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryWriter;
    use crate::store::AircraftStore;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    async fn accept_one(listener: &TcpListener) -> Connection {
        let (stream, peer) = listener.accept().await.unwrap();
        Connection::new(stream, peer)
    }

    async fn wait_for_records(store: &AircraftStore, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.len().await < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("records never appeared");
    }

    #[tokio::test]
    async fn test_worker_pool_minimum_one_worker() {
        let dir = tempfile::tempdir().unwrap();
        let handler = ConnectionHandler::new(
            Arc::new(AircraftStore::new()),
            Arc::new(HistoryWriter::new(dir.path())),
        );
        assert_eq!(WorkerPool::new(0, handler).workers(), 1);
    }

    #[tokio::test]
    async fn test_pool_queues_beyond_worker_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AircraftStore::new());
        let handler = ConnectionHandler::new(store.clone(), Arc::new(HistoryWriter::new(dir.path())));
        let pool = WorkerPool::new(1, handler);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // The first connection stays open and occupies the only worker.
        let mut first = TcpStream::connect(addr).await.unwrap();
        pool.submit(accept_one(&listener).await);
        first.write_all(b"1,0,100\n").await.unwrap();
        wait_for_records(&store, 1).await;

        let mut second = TcpStream::connect(addr).await.unwrap();
        pool.submit(accept_one(&listener).await);
        second.write_all(b"2,0,100\n2,END\n").await.unwrap();
        second.shutdown().await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.len().await, 1);

        drop(first);
        wait_for_records(&store, 2).await;
    }

    #[tokio::test]
    async fn test_spawn_dispatcher_runs_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AircraftStore::new());
        let handler = ConnectionHandler::new(store.clone(), Arc::new(HistoryWriter::new(dir.path())));
        let dispatcher = SpawnDispatcher::new(handler);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut first = TcpStream::connect(addr).await.unwrap();
        dispatcher.submit(accept_one(&listener).await);
        let mut second = TcpStream::connect(addr).await.unwrap();
        dispatcher.submit(accept_one(&listener).await);

        // Both open at once; both are served.
        first.write_all(b"1,0,100\n").await.unwrap();
        second.write_all(b"2,0,100\n").await.unwrap();
        wait_for_records(&store, 2).await;
    }
}
