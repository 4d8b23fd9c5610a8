// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print-job ingestion server -- makes this host act as a network printer.
//
// Clients speak the raw/AppSocket convention (HP JetDirect, port 9100):
// opening a TCP connection starts a job, closing it ends the job.  There is
// no framing, length prefix, or terminator beyond end-of-stream.  The
// received bytes are either a PJL-wrapped PostScript stream or an arbitrary
// binary document, decided by `DecodeMode`.
//
// # Concurrency model
//
// One accept-and-process loop, one job in flight at a time.  The loop is a
// cancellable blocking accept: `tokio::select!` races `accept()` against a
// `Notify` stop signal, so a stop request is observed immediately while
// idle.  A job already being read is always read to completion before the
// signal is re-checked.  The only state shared with the caller is the stop
// signal; job state never outlives its connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use jetspool_core::config::{DecodeMode, ServerConfig};
use jetspool_core::error::{JetspoolError, Result};
use jetspool_core::types::{JobMetadata, PrintJob, ServerStatus};

use crate::dispatch::{JobDispatcher, JobHandler};
use crate::pjl;
use crate::registrar::PrinterRegistrar;

/// Maximum bytes accepted for a single job.
/// Prevents unbounded memory consumption from misbehaving clients.
const MAX_JOB_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

/// Pause between finishing one job and accepting the next, bounding how
/// fast a misbehaving client can cycle connections.
const JOB_COOLDOWN: Duration = Duration::from_millis(100);

/// Virtual printer ingestion server.
///
/// Binds a TCP listener and consumes print jobs submitted by spoolers or
/// applications, strictly one at a time.  Created stopped; call [`start`]
/// to begin accepting and [`stop`] to shut down.  Registration with the
/// host happens inside `start`/`stop` only -- dropping a running server
/// does not unregister the endpoint.
///
/// [`start`]: PrintServer::start
/// [`stop`]: PrintServer::stop
pub struct PrintServer {
    config: ServerConfig,
    /// Current lifecycle state of the server.
    status: ServerStatus,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    /// Handle to the Tokio task running the accept loop.
    task_handle: Option<JoinHandle<()>>,
    /// Actual bound address, resolved after `start` (port 0 supported).
    local_addr: Option<SocketAddr>,
    handler: Option<Arc<dyn JobHandler>>,
    registrar: Option<Box<dyn PrinterRegistrar>>,
    /// Port identifier returned by the registrar, held until unregistration.
    registration: Option<String>,
}

impl PrintServer {
    /// Create a new server with the given configuration, in `Stopped` state.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            status: ServerStatus::Stopped,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            local_addr: None,
            handler: None,
            registrar: None,
            registration: None,
        }
    }

    /// Attach the handler that receives decoded jobs.
    ///
    /// Without one, raw jobs are spooled to the default spool file.
    pub fn with_handler(mut self, handler: Arc<dyn JobHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Attach the collaborator that registers the endpoint with the host.
    pub fn with_registrar(mut self, registrar: Box<dyn PrinterRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Return the current server status.
    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// The OS-resolved bound address, available once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Start the ingestion server.
    ///
    /// Binds the configured address (a bind failure is fatal and
    /// propagated, never retried), resolves the OS-assigned port, registers
    /// the printer endpoint when `auto_register` is set, and spawns the
    /// accept loop.  Idempotent while running.
    pub async fn start(&mut self) -> Result<()> {
        if self.status == ServerStatus::Running {
            debug!(addr = ?self.local_addr, "print server already running");
            return Ok(());
        }

        self.status = ServerStatus::Starting;

        let bind_addr = self.config.socket_addr();
        let listener = match TcpListener::bind(bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Stopped;
                return Err(JetspoolError::Bind(format!("{bind_addr}: {e}")));
            }
        };

        // Normalise to the OS-assigned values before registration -- the
        // registrar needs the real port when the config asked for port 0.
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.status = ServerStatus::Stopped;
                return Err(JetspoolError::Bind(format!("resolve local addr: {e}")));
            }
        };
        self.local_addr = Some(local_addr);

        info!(addr = %local_addr, "print server listening");

        if self.config.auto_register {
            self.register(local_addr);
        }

        let mut dispatcher = JobDispatcher::new(self.handler.clone());
        if let Some(path) = &self.config.spool_path {
            dispatcher = dispatcher.with_spool_path(path);
        }

        let shutdown = Arc::clone(&self.shutdown_signal);
        let decode = self.config.decode;

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, decode, dispatcher).await;
        });

        self.task_handle = Some(handle);
        self.status = ServerStatus::Running;
        Ok(())
    }

    /// Gracefully stop the server.
    ///
    /// Signals the accept loop and awaits its completion; a job already in
    /// flight is read and dispatched before the loop exits.  The listener
    /// is released and the endpoint unregistered on every exit path.
    /// Idempotent while stopped.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        self.status = ServerStatus::Stopping;
        info!(addr = ?self.local_addr, "stopping print server");

        self.shutdown_signal.notify_one();

        let join_result = match self.task_handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| JetspoolError::Receive(format!("accept task join: {e}"))),
            None => Ok(()),
        };

        // Unregistration must happen even when the accept task died.
        self.unregister();

        self.status = ServerStatus::Stopped;
        info!("print server stopped");
        join_result
    }

    /// Register the endpoint with the attached registrar.
    ///
    /// Registration failure is not fatal -- the endpoint stays reachable by
    /// explicit address.
    fn register(&mut self, local_addr: SocketAddr) {
        let Some(registrar) = self.registrar.as_mut() else {
            debug!("auto_register set but no registrar attached");
            return;
        };

        match registrar.register(
            &self.config.display_name,
            local_addr.ip(),
            local_addr.port(),
        ) {
            Ok(port_id) => {
                info!(
                    name = %self.config.display_name,
                    port_id = %port_id,
                    "printer endpoint registered"
                );
                self.registration = Some(port_id);
            }
            Err(e) => {
                warn!(error = %e, "printer registration failed -- continuing unregistered");
            }
        }
    }

    /// Unregister the endpoint if a registration is held.
    fn unregister(&mut self) {
        let Some(port_id) = self.registration.take() else {
            return;
        };
        let Some(registrar) = self.registrar.as_mut() else {
            return;
        };

        if let Err(e) = registrar.unregister(&self.config.display_name, &port_id) {
            warn!(error = %e, port_id = %port_id, "failed to unregister printer endpoint");
        }
    }

    /// The main accept loop.
    ///
    /// Runs until the shutdown signal is received.  Connections are served
    /// inline, strictly one at a time -- a slow handler delays the next
    /// accept by design.  No single job's failure terminates the loop.
    async fn accept_loop(
        listener: TcpListener,
        shutdown: Arc<Notify>,
        decode: DecodeMode,
        dispatcher: JobDispatcher,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            info!(peer = %peer_addr, "incoming print job -- spooling");
                            match Self::receive_job(stream, peer_addr, decode).await {
                                Ok(Some(job)) => {
                                    if let Err(e) = dispatcher.dispatch(job) {
                                        warn!(
                                            peer = %peer_addr,
                                            error = %e,
                                            "job dispatch failed -- continuing"
                                        );
                                    }
                                }
                                Ok(None) => {}
                                Err(e) => {
                                    warn!(peer = %peer_addr, error = %e, "failed to receive job");
                                }
                            }
                            tokio::time::sleep(JOB_COOLDOWN).await;
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
        // The listener drops here, releasing the socket for rebinding.
    }

    /// Read one client's stream to completion and decode it into a job.
    ///
    /// End-of-stream is the sole job boundary.  A connection that yields no
    /// bytes is an empty job: logged and discarded (`Ok(None)`), never an
    /// error that would disturb the accept loop.
    async fn receive_job(
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        decode: DecodeMode,
    ) -> Result<Option<PrintJob>> {
        let mut raw = Vec::with_capacity(8192);

        let mut limited = (&mut stream).take(MAX_JOB_BYTES as u64);
        let bytes_read = limited
            .read_to_end(&mut raw)
            .await
            .map_err(|e| JetspoolError::Receive(format!("read from {peer_addr}: {e}")))?;

        if bytes_read == 0 {
            warn!(peer = %peer_addr, "connection closed without data -- empty job discarded");
            return Ok(None);
        }

        if bytes_read == MAX_JOB_BYTES {
            warn!(
                peer = %peer_addr,
                limit = MAX_JOB_BYTES,
                "job reached the size cap -- stream truncated"
            );
        }

        let (metadata, body_offset) = match decode {
            DecodeMode::Pjl => pjl::extract_metadata(&raw),
            DecodeMode::Raw => (JobMetadata::default(), 0),
        };

        let document_hash = content_hash(&raw);
        let job = PrintJob::new(
            Some(peer_addr.ip()),
            raw,
            body_offset,
            metadata,
            document_hash,
        );

        info!(
            job_id = %job.id,
            peer = %peer_addr,
            bytes = bytes_read,
            title = job.metadata.title.as_deref(),
            author = job.metadata.author.as_deref(),
            filename = job.metadata.filename.as_deref(),
            "print job received"
        );

        Ok(Some(job))
    }
}

/// SHA-256 content hash of the raw job bytes, hex-encoded.
fn content_hash(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty".into();
    }
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
