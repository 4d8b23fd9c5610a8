// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Jetspool virtual printer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::net::IpAddr;
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata recovered from a job's PJL preamble.
///
/// All fields are optional -- a job without a preamble (or with an
/// unparseable one) carries no metadata at all, and downstream consumers
/// must supply their own fallback naming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Display title of the job, as reported by the submitting spooler.
    pub title: Option<String>,
    /// The user the spooler attributed the job to.
    pub author: Option<String>,
    /// Originating filename, when the spooler reported one that exists.
    pub filename: Option<String>,
}

impl JobMetadata {
    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.filename.is_none()
    }

    /// Fill in a missing title from the filename with its extension stripped.
    ///
    /// A title set by the spooler is never replaced.
    pub fn derive_title(&mut self) {
        if self.title.is_some() {
            return;
        }
        if let Some(filename) = &self.filename {
            self.title = Path::new(filename)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
    }
}

/// One accepted connection's full payload plus recovered metadata.
///
/// A job exists only for the duration of one connection's processing;
/// ownership moves from the receiver through the extractor to the
/// dispatcher and is never retained by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    /// Peer address of the submitting client, when received over the network.
    pub remote_addr: Option<IpAddr>,
    pub received_at: DateTime<Utc>,
    /// Everything read from the connection, byte for byte.
    raw: Vec<u8>,
    /// Offset where the document payload starts (0 when no preamble).
    body_offset: usize,
    pub metadata: JobMetadata,
    /// SHA-256 hash of the raw bytes, hex-encoded.
    pub document_hash: String,
}

impl PrintJob {
    pub fn new(
        remote_addr: Option<IpAddr>,
        raw: Vec<u8>,
        body_offset: usize,
        metadata: JobMetadata,
        document_hash: String,
    ) -> Self {
        let body_offset = body_offset.min(raw.len());
        Self {
            id: JobId::new(),
            remote_addr,
            received_at: Utc::now(),
            raw,
            body_offset,
            metadata,
            document_hash,
        }
    }

    /// The full raw byte stream as received, preamble included.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The document payload -- everything after the control-language preamble.
    pub fn body(&self) -> &[u8] {
        &self.raw[self.body_offset..]
    }

    /// Lossy text reconstruction of the payload, for text-oriented handlers.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.body())
    }
}

/// Coarse classification of a job's document payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    PostScript,
    PlainText,
    Unknown,
}

impl DocumentType {
    /// MIME type string for this payload class.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PostScript => "application/postscript",
            Self::PlainText => "text/plain",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Lifecycle states of the print server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metadata_reports_empty() {
        let meta = JobMetadata::default();
        assert!(meta.is_empty());
    }

    #[test]
    fn derive_title_strips_extension() {
        let mut meta = JobMetadata {
            filename: Some("quarterly-report.doc".into()),
            ..Default::default()
        };
        meta.derive_title();
        assert_eq!(meta.title.as_deref(), Some("quarterly-report"));
    }

    #[test]
    fn derive_title_never_replaces_existing_title() {
        let mut meta = JobMetadata {
            title: Some("Invoice".into()),
            filename: Some("notes.doc".into()),
            ..Default::default()
        };
        meta.derive_title();
        assert_eq!(meta.title.as_deref(), Some("Invoice"));
    }

    #[test]
    fn derive_title_without_filename_leaves_title_unset() {
        let mut meta = JobMetadata::default();
        meta.derive_title();
        assert!(meta.title.is_none());
    }

    #[test]
    fn job_body_starts_at_offset() {
        let raw = b"@PJL JOB\n%!PS-Adobe-3.0\n".to_vec();
        let offset = raw.windows(5).position(|w| w == b"%!PS-").unwrap();
        let job = PrintJob::new(None, raw, offset, JobMetadata::default(), "empty".into());
        assert!(job.body().starts_with(b"%!PS-"));
        assert!(job.raw().starts_with(b"@PJL"));
    }

    #[test]
    fn job_body_offset_is_clamped() {
        let job = PrintJob::new(None, b"abc".to_vec(), 99, JobMetadata::default(), "x".into());
        assert!(job.body().is_empty());
    }
}
