// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The detector facade. Wires the pipeline stages together and owns the
// per-frame control flow, including the empty-frame short circuit.

use kantwerk_core::config::DetectConfig;
use kantwerk_core::error::Result;
use kantwerk_core::types::{DetectionResult, FrameView, ScaledPolygon};
use tracing::{debug, info, instrument};

use crate::stages::{blur, contours, morphology, scale};
use crate::stages::{EdgeExtractor, Preprocessor, QuadSelector};

/// Per-frame document boundary detector.
///
/// A detector is immutable after construction and holds no per-frame state,
/// so the same instance can serve any number of frames and identical input
/// always produces identical output.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectConfig,
    preprocessor: Preprocessor,
    edges: EdgeExtractor,
    selector: QuadSelector,
}

impl Detector {
    /// Build a detector, validating the configuration up front.
    pub fn new(config: DetectConfig) -> Result<Self> {
        config.validate()?;
        info!(
            working_width = config.working_width,
            edge_low = config.edge_low_threshold,
            edge_high = config.edge_high_threshold,
            min_contour_area = config.min_contour_area,
            "Detector initialised"
        );
        Ok(Self {
            preprocessor: Preprocessor::new(config.working_width),
            edges: EdgeExtractor::new(config.edge_low_threshold, config.edge_high_threshold),
            selector: QuadSelector::new(config.min_contour_area, config.epsilon_ratio),
            config,
        })
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Run the pipeline on one frame, yielding the result in
    /// working-resolution coordinates.
    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn detect(&self, frame: &FrameView<'_>) -> Result<DetectionResult> {
        let (result, _) = self.run_pipeline(frame)?;
        Ok(result)
    }

    /// Run the pipeline and map the detected boundary back into
    /// original-frame coordinates, ready for overlay rendering.
    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn detect_scaled(&self, frame: &FrameView<'_>) -> Result<Option<ScaledPolygon>> {
        let (_, polygon) = self.detect_with_mapping_inner(frame)?;
        Ok(polygon)
    }

    /// Run the pipeline once and return both the working-space result and
    /// the frame-space polygon.
    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn detect_with_mapping(
        &self,
        frame: &FrameView<'_>,
    ) -> Result<(DetectionResult, Option<ScaledPolygon>)> {
        self.detect_with_mapping_inner(frame)
    }

    fn detect_with_mapping_inner(
        &self,
        frame: &FrameView<'_>,
    ) -> Result<(DetectionResult, Option<ScaledPolygon>)> {
        let (result, ratio) = self.run_pipeline(frame)?;
        let polygon = match result {
            DetectionResult::Document(quad) => Some(scale::to_frame_space(&quad, ratio)),
            DetectionResult::NoDocument => None,
        };
        Ok((result, polygon))
    }

    /// The six stages in order. Every intermediate buffer lives and dies
    /// inside this call.
    fn run_pipeline(&self, frame: &FrameView<'_>) -> Result<(DetectionResult, f32)> {
        if frame.is_empty() {
            debug!("Zero-area frame, skipping pipeline");
            return Ok((DetectionResult::NoDocument, 1.0));
        }
        let (intensity, ratio) = self.preprocessor.run(frame);
        let opened = morphology::open(&intensity, self.config.morph_kernel_size);
        let cleaned = morphology::close(&opened, self.config.morph_kernel_size);
        let smoothed = blur::gaussian(&cleaned, self.config.blur_kernel_size);
        let edge_map = self.edges.run(&smoothed);
        let traced = contours::trace_contours(&edge_map)?;
        let result = self.selector.select(&traced);
        Ok((result, ratio))
    }
}

impl Default for Detector {
    fn default() -> Self {
        let config = DetectConfig::default();
        Self {
            preprocessor: Preprocessor::new(config.working_width),
            edges: EdgeExtractor::new(config.edge_low_threshold, config.edge_high_threshold),
            selector: QuadSelector::new(config.min_contour_area, config.epsilon_ratio),
            config,
        }
    }
}
