// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kantwerk-capture — Frame acquisition for Kantwerk.
//
// Provides the `FrameSource` seam implemented by platform camera bridges, a
// directory-replay source for demos and tests, and the worker thread that
// keeps detection off the capture thread.

pub mod source;
pub mod worker;

// Re-export the primary types so callers can use `kantwerk_capture::DetectionWorker` etc.
pub use source::{DirectorySource, FrameSource};
pub use worker::{DetectionUpdate, DetectionWorker, WorkerStats};
