// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kantwerk-detect — Document boundary detection for the Kantwerk preview pipeline.
//
// Provides the per-frame detection pipeline (intensity preprocessing, morphological
// cleanup, Gaussian smoothing, two-threshold edge extraction, contour tracing and
// quadrilateral selection) behind the `Detector` facade.

pub mod detector;
pub mod stages;

// Re-export the facade so callers can use `kantwerk_detect::Detector` directly.
pub use detector::Detector;
