// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job dispatch -- hands a decoded print job to the registered handler, or
// spools the raw bytes to disk when no handler is registered.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use jetspool_core::error::Result;
use jetspool_core::types::PrintJob;

/// Spool file written in the working directory when no handler is registered.
pub const DEFAULT_SPOOL_FILE: &str = "jetspool-received.ps";

/// Externally supplied processing for received print jobs.
///
/// The handler owns the job -- nothing about it is retained by the server
/// once `handle` returns.  Handlers run on the receive task, one job at a
/// time; a slow handler delays acceptance of the next job by design.
pub trait JobHandler: Send + Sync {
    fn handle(&self, job: PrintJob) -> Result<()>;
}

impl<F> JobHandler for F
where
    F: Fn(PrintJob) -> Result<()> + Send + Sync,
{
    fn handle(&self, job: PrintJob) -> Result<()> {
        self(job)
    }
}

/// Routes each completed job to the handler, with a zero-configuration
/// fallback of writing the raw stream to a fixed spool file.
pub struct JobDispatcher {
    handler: Option<Arc<dyn JobHandler>>,
    spool_path: PathBuf,
}

impl JobDispatcher {
    pub fn new(handler: Option<Arc<dyn JobHandler>>) -> Self {
        Self {
            handler,
            spool_path: PathBuf::from(DEFAULT_SPOOL_FILE),
        }
    }

    /// Override where the no-handler fallback writes raw jobs.
    pub fn with_spool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spool_path = path.into();
        self
    }

    /// Dispatch one job.  Completes or propagates the handler's error;
    /// the caller decides that a failed job does not stop the server.
    ///
    /// Without a handler the raw bytes are written verbatim to the spool
    /// file -- no metadata is required for this path.
    pub fn dispatch(&self, job: PrintJob) -> Result<()> {
        match &self.handler {
            Some(handler) => {
                debug!(
                    job_id = %job.id,
                    title = job.metadata.title.as_deref(),
                    author = job.metadata.author.as_deref(),
                    filename = job.metadata.filename.as_deref(),
                    "dispatching job to handler"
                );
                handler.handle(job)
            }
            None => {
                info!(
                    job_id = %job.id,
                    bytes = job.raw().len(),
                    spool = %self.spool_path.display(),
                    "no handler registered -- spooling raw job"
                );
                std::fs::write(&self.spool_path, job.raw())?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use jetspool_core::JetspoolError;
    use jetspool_core::types::JobMetadata;

    fn test_job(raw: &[u8], metadata: JobMetadata) -> PrintJob {
        PrintJob::new(None, raw.to_vec(), 0, metadata, "testhash".into())
    }

    #[test]
    fn spool_fallback_writes_exact_raw_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spool = dir.path().join("out.ps");
        let dispatcher = JobDispatcher::new(None).with_spool_path(&spool);

        let raw: Vec<u8> = (0u8..=255).collect();
        dispatcher
            .dispatch(test_job(&raw, JobMetadata::default()))
            .expect("dispatch");

        let written = std::fs::read(&spool).expect("read spool");
        assert_eq!(written, raw);
    }

    #[test]
    fn spool_fallback_needs_no_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spool = dir.path().join("out.ps");
        let dispatcher = JobDispatcher::new(None).with_spool_path(&spool);

        let job = test_job(b"", JobMetadata::default());
        assert!(job.metadata.is_empty());
        dispatcher.dispatch(job).expect("dispatch");
        assert!(spool.exists());
    }

    #[test]
    fn handler_receives_job_with_metadata() {
        let received: Arc<Mutex<Option<PrintJob>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);
        let dispatcher = JobDispatcher::new(Some(Arc::new(move |job: PrintJob| {
            *slot.lock().unwrap() = Some(job);
            Ok(())
        })));

        let metadata = JobMetadata {
            title: Some("Invoice".into()),
            author: Some("alice".into()),
            filename: None,
        };
        dispatcher
            .dispatch(test_job(b"%!PS-Adobe-3.0", metadata))
            .expect("dispatch");

        let job = received.lock().unwrap().take().expect("handler ran");
        assert_eq!(job.metadata.title.as_deref(), Some("Invoice"));
        assert_eq!(job.metadata.author.as_deref(), Some("alice"));
    }

    #[test]
    fn handler_error_propagates() {
        let dispatcher = JobDispatcher::new(Some(Arc::new(|_job: PrintJob| {
            Err(JetspoolError::Handler("conversion failed".into()))
        })));

        let result = dispatcher.dispatch(test_job(b"data", JobMetadata::default()));
        assert!(matches!(result, Err(JetspoolError::Handler(_))));
    }
}
