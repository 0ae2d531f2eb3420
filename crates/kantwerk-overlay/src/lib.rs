// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kantwerk-overlay — Detection overlay rendering for Kantwerk.
//
// Paints the detected document boundary (translucent fill, stroked edges,
// corner markers) and the document alignment guide onto RGBA frames.

pub mod renderer;
pub mod style;

// Re-export the primary structs so callers can use `kantwerk_overlay::OverlayRenderer` etc.
pub use renderer::OverlayRenderer;
pub use style::OverlayStyle;
