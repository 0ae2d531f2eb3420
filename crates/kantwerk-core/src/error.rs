// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kantwerk.

use thiserror::Error;

/// Top-level error type for all Kantwerk operations.
#[derive(Debug, Error)]
pub enum KantwerkError {
    // -- Frame errors --
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("capture source failed: {0}")]
    Capture(String),

    // -- Pipeline errors --
    #[error("detection stage failed: {0}")]
    Stage(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Rendering errors --
    #[error("overlay rendering failed: {0}")]
    Render(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KantwerkError>;
