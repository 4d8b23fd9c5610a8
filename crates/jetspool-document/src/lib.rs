// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jetspool Document -- payload classification and PDF rendering for
// received print jobs.  The ingestion server makes no assumptions about
// document content; handlers use this crate to decide what a payload is
// and to persist it as a PDF.

pub mod detect;
pub mod render;

pub use detect::detect;
pub use render::PdfRenderer;
