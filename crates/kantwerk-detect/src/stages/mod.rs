// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The pipeline stages, in execution order: preprocess, morphology, blur,
// edges, contours, quad selection, coordinate scaling.

pub mod blur;
pub mod contours;
pub mod edges;
pub mod morphology;
pub mod preprocess;
pub mod quad;
pub mod scale;

pub use contours::trace_contours;
pub use edges::EdgeExtractor;
pub use preprocess::Preprocessor;
pub use quad::QuadSelector;
