// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay styling. One immutable value carries every colour and size the
// renderer needs, so the look is tuned in a single place and never through
// shared mutable paint state.

use serde::{Deserialize, Serialize};

/// Colours and sizes for the detection overlay.
///
/// Channel values are RGBA. The defaults are the steel blue boundary and
/// translucent powder blue fill of the original preview overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Boundary stroke colour.
    pub stroke_color: [u8; 4],
    /// Boundary stroke width in pixels.
    pub stroke_width: u32,
    /// Interior fill colour; the alpha channel sets the blend strength.
    pub fill_color: [u8; 4],
    /// Length of each corner marker arm in pixels.
    pub corner_length: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_color: [70, 130, 180, 255],
            stroke_width: 3,
            fill_color: [176, 224, 230, 77],
            corner_length: 20,
        }
    }
}
