// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PJL (Printer Job Language) header extraction.
//
// Print spoolers wrap PostScript jobs in a PJL preamble that carries job
// metadata before the page-description content begins:
//
// ```text
// <ESC>%-12345X@PJL
// @PJL JOB NAME="quarterly-report.doc"
// @PJL COMMENT "username: alice; app filename: quarterly-report.doc"
// @PJL ENTER LANGUAGE=POSTSCRIPT
// %!PS-Adobe-3.0
// ...page content...
// ```
//
// The payload boundary is the first occurrence of the PostScript
// start-of-job marker; everything before it (from the first `@`) is the
// candidate header region.  A job without the marker -- a bare binary
// document dumped at the socket -- passes through untouched with no
// metadata, never an error.
//
// # Directive forms
//
//   - `@PJL JOB NAME="<value>"` -- the value is a filename if a file with
//     that exact name exists on the local filesystem, otherwise a title.
//   - `@PJL COMMENT "<k1:v1;k2:v2;...>"` -- semicolon-delimited key/value
//     pairs; `username` names the author, `app filename` is consulted for
//     a filename/title only when no title has been set yet.
//
// Anything else is ignored without error.

use std::path::Path;

use tracing::{debug, trace};

use jetspool_core::types::JobMetadata;

/// Start-of-job marker for PostScript content.
const POSTSCRIPT_MARKER: &[u8] = b"%!PS-";

/// Prefix shared by every PJL directive line.
const DIRECTIVE_PREFIX: &str = "@PJL";

// ---------------------------------------------------------------------------
// PjlHeader
// ---------------------------------------------------------------------------

/// The parsed directives of one job's PJL preamble.
///
/// Directives are kept in order of appearance with lower-cased names, since
/// appearance order decides which later directive may override an earlier
/// inferred value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PjlHeader {
    /// `(name, value)` pairs in line order; names are lower-cased.
    directives: Vec<(String, String)>,
}

impl PjlHeader {
    /// Find the first directive with the given name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.directives
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate directives in order of appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.directives.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.directives.push((name.into(), value.into()));
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Scan a raw job buffer for a PJL preamble.
///
/// Returns the parsed header and the offset where the document payload
/// begins.  When the PostScript marker is absent the header is empty and
/// the offset is 0 -- the entire buffer is payload.
pub fn extract(raw: &[u8]) -> (PjlHeader, usize) {
    let Some(marker) = find_subsequence(raw, POSTSCRIPT_MARKER) else {
        trace!("no PostScript marker -- treating entire buffer as payload");
        return (PjlHeader::default(), 0);
    };

    // The preamble may open with a UEL escape sequence before the first
    // directive; reassemble the header region from the first `@` onward.
    let preamble = &raw[..marker];
    let Some(at) = preamble.iter().position(|&b| b == b'@') else {
        debug!(marker, "PostScript marker without PJL directives");
        return (PjlHeader::default(), marker);
    };

    let region = String::from_utf8_lossy(&preamble[at..]);
    let header = parse_directives(&region);

    debug!(
        directives = header.len(),
        payload_offset = marker,
        "PJL header extracted"
    );

    (header, marker)
}

/// Extract the header and fold it straight into job metadata.
///
/// Convenience for the receive path: returns the inferred metadata and the
/// payload offset.
pub fn extract_metadata(raw: &[u8]) -> (JobMetadata, usize) {
    let (header, offset) = extract(raw);
    (infer_metadata(&header), offset)
}

/// Parse the directive lines of a header region.
fn parse_directives(region: &str) -> PjlHeader {
    let mut header = PjlHeader::default();

    for line in region.lines() {
        let line = line.trim();
        let Some(rest) = strip_prefix_ignore_case(line, DIRECTIVE_PREFIX) else {
            continue;
        };
        let rest = rest.trim_start();

        if strip_prefix_ignore_case(rest, "JOB NAME=").is_some() {
            // Value is the text between the first pair of double quotes.
            if let Some(name) = quoted(line) {
                header.push("job name", name);
            }
        } else if strip_prefix_ignore_case(rest, "COMMENT").is_some() {
            let Some(params) = quoted(line) else {
                continue;
            };
            for param in params.split(';') {
                let mut kv = param.splitn(2, ':');
                let (Some(key), Some(value)) = (kv.next(), kv.next()) else {
                    continue;
                };
                header.push(key.trim().to_ascii_lowercase(), value.trim());
            }
        }
        // Other directives (ENTER LANGUAGE, SET, ...) carry no job metadata.
    }

    header
}

// ---------------------------------------------------------------------------
// Metadata inference
// ---------------------------------------------------------------------------

/// What a spooler-reported name turned out to be.
enum NameKind {
    /// A file with that exact name exists on the local filesystem.
    File,
    /// No such file -- the name is a display title.
    Title,
}

/// Decide whether a reported job name refers to a real file.
fn classify_name(name: &str) -> NameKind {
    if Path::new(name).exists() {
        NameKind::File
    } else {
        NameKind::Title
    }
}

/// Fold a parsed header into job metadata.
///
/// Directives apply in order of appearance.  A title set by a `JOB NAME`
/// directive is never overwritten by a later `app filename` comment, while
/// `username` always applies.  Afterwards a missing title is derived from
/// the filename with its extension stripped.
pub fn infer_metadata(header: &PjlHeader) -> JobMetadata {
    let mut meta = JobMetadata::default();

    for (name, value) in header.iter() {
        match name {
            "job name" => match classify_name(value) {
                NameKind::File => meta.filename = Some(value.to_string()),
                NameKind::Title => meta.title = Some(value.to_string()),
            },
            "username" => meta.author = Some(value.to_string()),
            "app filename" if meta.title.is_none() => match classify_name(value) {
                NameKind::File => meta.filename = Some(value.to_string()),
                NameKind::Title => meta.title = Some(value.to_string()),
            },
            _ => {}
        }
    }

    meta.derive_title();
    meta
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Case-insensitive `strip_prefix` for ASCII directive keywords.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

/// The text between the first pair of double quotes, if any.
///
/// A line with an opening quote but no closing one yields the remainder --
/// malformed directives degrade rather than abort the job.
fn quoted(s: &str) -> Option<&str> {
    s.split('"').nth(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
