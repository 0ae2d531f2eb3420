// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{KantwerkError, Result};

/// Tunable parameters of the detection pipeline.
///
/// The defaults are the values the pipeline ships with; profiles loaded
/// from JSON may override any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Width every frame is downscaled to before processing.
    pub working_width: u32,
    /// Side length of the square structuring element used by the
    /// morphological open and close.
    pub morph_kernel_size: u32,
    /// Side length of the Gaussian smoothing kernel (must be odd).
    pub blur_kernel_size: u32,
    /// Lower gradient threshold for edge hysteresis.
    pub edge_low_threshold: f32,
    /// Upper gradient threshold for edge hysteresis.
    pub edge_high_threshold: f32,
    /// Minimum enclosed area (in working-resolution pixels) a contour
    /// needs to be considered a document candidate.
    pub min_contour_area: f32,
    /// Polygon simplification tolerance as a fraction of the contour
    /// perimeter.
    pub epsilon_ratio: f32,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            working_width: 500,
            morph_kernel_size: 4,
            blur_kernel_size: 7,
            edge_low_threshold: 75.0,
            edge_high_threshold: 100.0,
            min_contour_area: 2000.0,
            epsilon_ratio: 0.1,
        }
    }
}

impl DetectConfig {
    /// Check internal consistency. Called by the detector on construction
    /// so a bad profile fails once, up front, instead of per frame.
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 {
            return Err(KantwerkError::Config(
                "working_width must be at least 1".into(),
            ));
        }
        if self.morph_kernel_size == 0 {
            return Err(KantwerkError::Config(
                "morph_kernel_size must be at least 1".into(),
            ));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(KantwerkError::Config(format!(
                "blur_kernel_size must be odd, got {}",
                self.blur_kernel_size
            )));
        }
        if !self.edge_low_threshold.is_finite() || self.edge_low_threshold < 0.0 {
            return Err(KantwerkError::Config(format!(
                "edge_low_threshold must be a non-negative number, got {}",
                self.edge_low_threshold
            )));
        }
        if !self.edge_high_threshold.is_finite()
            || self.edge_high_threshold < self.edge_low_threshold
        {
            return Err(KantwerkError::Config(format!(
                "edge_high_threshold ({}) must be >= edge_low_threshold ({})",
                self.edge_high_threshold, self.edge_low_threshold
            )));
        }
        if !self.min_contour_area.is_finite() || self.min_contour_area < 0.0 {
            return Err(KantwerkError::Config(format!(
                "min_contour_area must be a non-negative number, got {}",
                self.min_contour_area
            )));
        }
        if !self.epsilon_ratio.is_finite() || self.epsilon_ratio <= 0.0 {
            return Err(KantwerkError::Config(format!(
                "epsilon_ratio must be a positive number, got {}",
                self.epsilon_ratio
            )));
        }
        Ok(())
    }

    /// Parse a JSON profile. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
