//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::{BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{RecipeError, Result};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and drain its workers
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// TCP server for RecipeBox
///
/// ```text
///   acceptor ──(bounded channel)──▶ worker 1..N ──▶ Connection::handle
/// ```
/// `max_connections` caps connections queued plus in service; extra clients
/// get one ERROR response and are closed.
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address (idempotent) and return the bound address
    ///
    /// Binding to port 0 picks a free port; tests read it back from here.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        tracing::info!("Listening on {}", addr);

        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking)
    ///
    /// Returns after `shutdown` once every worker has finished its
    /// current connection.
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        self.bind()?;
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| RecipeError::Config("listener not bound".to_string()))?;

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for worker_id in 0..self.config.worker_threads {
            let receiver = receiver.clone();
            let engine = Arc::clone(&self.engine);
            let active = Arc::clone(&self.active);
            let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

            let handle = thread::Builder::new()
                .name(format!("recipebox-worker-{}", worker_id))
                .spawn(move || worker_loop(receiver, engine, active, read_ms, write_ms))?;
            workers.push(handle);
        }
        drop(receiver);

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
                        tracing::warn!("Rejecting {}: connection limit reached", addr);
                        reject(stream);
                        continue;
                    }

                    // One bad socket must not stop the acceptor
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping {}: cannot switch to blocking mode: {}", addr, e);
                        continue;
                    }
                    self.active.fetch_add(1, Ordering::SeqCst);
                    if sender.send(stream).is_err() {
                        // Every worker is gone
                        self.active.fetch_sub(1, Ordering::SeqCst);
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, waiting for {} worker(s)", workers.len());
        drop(sender);
        for handle in workers {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Connections queued or being served right now
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

fn worker_loop(
    receiver: Receiver<TcpStream>,
    engine: Arc<Engine>,
    active: Arc<AtomicUsize>,
    read_ms: u64,
    write_ms: u64,
) {
    for stream in receiver.iter() {
        let result = Connection::new(stream, Arc::clone(&engine)).and_then(|mut conn| {
            conn.set_timeouts(read_ms, write_ms)?;
            conn.handle()
        });
        if let Err(e) = result {
            tracing::debug!("Connection ended with error: {}", e);
        }
        active.fetch_sub(1, Ordering::SeqCst);
    }
}

fn reject(stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut writer = BufWriter::new(stream);
    let _ = write_response(&mut writer, &Response::error("connection limit reached"));
}
