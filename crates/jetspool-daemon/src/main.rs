// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jetspool -- Virtual Network Printer Endpoint
//
// Entry point. Initialises logging, starts the ingestion server with a
// PDF-save handler and mDNS registration, and runs until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use jetspool_core::config::ServerConfig;
use jetspool_core::error::{JetspoolError, Result};
use jetspool_core::types::{DocumentType, PrintJob};
use jetspool_document::{PdfRenderer, detect};
use jetspool_server::dispatch::JobHandler;
use jetspool_server::{MdnsRegistrar, PrintServer};

/// Saves every received job into the output directory as a PDF.
///
/// PDF payloads pass through verbatim; text and PostScript payloads are
/// rendered with [`PdfRenderer`]. Anything else is refused per job -- the
/// server logs the failure and keeps accepting.
struct PdfSaveHandler {
    out_dir: PathBuf,
}

impl PdfSaveHandler {
    fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    /// Output path for a job: title, else filename stem, else the job id.
    fn output_path(&self, job: &PrintJob) -> PathBuf {
        let stem = job
            .metadata
            .title
            .clone()
            .or_else(|| {
                job.metadata.filename.as_deref().and_then(|f| {
                    std::path::Path::new(f)
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                })
            })
            .unwrap_or_else(|| job.id.to_string());

        self.out_dir.join(format!("{}.pdf", sanitize(&stem)))
    }
}

impl JobHandler for PdfSaveHandler {
    fn handle(&self, job: PrintJob) -> Result<()> {
        let path = self.output_path(&job);

        match detect(job.body()) {
            DocumentType::Pdf => {
                std::fs::write(&path, job.body())?;
            }
            DocumentType::PostScript | DocumentType::PlainText => {
                let mut renderer = PdfRenderer::new();
                if let Some(title) = &job.metadata.title {
                    renderer.set_title(title);
                }
                renderer.write_text_to_file(&job.body_text(), &path)?;
            }
            DocumentType::Unknown => {
                warn!(job_id = %job.id, "unrecognised payload -- not saved");
                return Err(JetspoolError::UnsupportedDocument(
                    "unrecognised document payload".into(),
                ));
            }
        }

        info!(
            job_id = %job.id,
            author = job.metadata.author.as_deref(),
            path = %path.display(),
            "print job saved"
        );
        Ok(())
    }
}

/// Replace path-hostile characters in a spooler-supplied name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("jetspool starting");

    let config = ServerConfig::default();
    let handler = Arc::new(PdfSaveHandler::new(std::env::current_dir()?));

    let mut server = PrintServer::new(config)
        .with_handler(handler)
        .with_registrar(Box::new(MdnsRegistrar::new()));

    server.start().await?;
    if let Some(addr) = server.local_addr() {
        info!(addr = %addr, "virtual printer ready");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }

    info!("shutdown requested");
    server.stop().await?;
    Ok(())
}
