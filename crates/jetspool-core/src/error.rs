// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Jetspool.

use thiserror::Error;

/// Top-level error type for all Jetspool operations.
#[derive(Debug, Error)]
pub enum JetspoolError {
    // -- Server errors --
    #[error("failed to bind listener: {0}")]
    Bind(String),

    #[error("failed to receive job: {0}")]
    Receive(String),

    #[error("job dispatch failed: {0}")]
    Dispatch(String),

    #[error("job handler failed: {0}")]
    Handler(String),

    #[error("printer registration failed: {0}")]
    Registrar(String),

    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    // -- I/O and serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JetspoolError>;
