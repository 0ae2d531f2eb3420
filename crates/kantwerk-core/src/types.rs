// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Kantwerk detection pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{KantwerkError, Result};

/// Unique identifier for one capture/processing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interleaved channel order of a frame buffer.
///
/// Camera stacks disagree on channel order (Android surfaces deliver RGBA,
/// iOS delivers BGRA), and the intensity conversion must read the right
/// channels to apply correct luma weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
    Rgb8,
}

impl PixelFormat {
    /// Bytes per interleaved pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 => 3,
        }
    }

    /// Byte offsets of the (red, green, blue) channels within one pixel.
    pub fn rgb_offsets(&self) -> (usize, usize, usize) {
        match self {
            Self::Rgba8 | Self::Rgb8 => (0, 1, 2),
            Self::Bgra8 => (2, 1, 0),
        }
    }
}

/// One owned camera frame: an interleaved pixel buffer plus its geometry and
/// capture timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Wrap a pixel buffer, validating its length against the declared
    /// geometry.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        check_buffer_len(pixels.len(), width, height, format)?;
        Ok(Self {
            pixels,
            width,
            height,
            format,
            captured_at: Utc::now(),
        })
    }

    /// Read-only view for one pipeline invocation.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            pixels: &self.pixels,
            width: self.width,
            height: self.height,
            format: self.format,
            captured_at: self.captured_at,
        }
    }
}

/// Read-only borrowed view of a frame, valid only while processing it.
///
/// The pipeline never holds on to a view across invocations.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub captured_at: DateTime<Utc>,
}

impl<'a> FrameView<'a> {
    /// Wrap an externally owned buffer without copying.
    pub fn new(pixels: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        check_buffer_len(pixels.len(), width, height, format)?;
        Ok(Self {
            pixels,
            width,
            height,
            format,
            captured_at: Utc::now(),
        })
    }

    /// Whether the frame has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn check_buffer_len(len: usize, width: u32, height: u32, format: PixelFormat) -> Result<()> {
    let expected = width as usize * height as usize * format.bytes_per_pixel();
    if len != expected {
        return Err(KantwerkError::InvalidFrame(format!(
            "buffer holds {} bytes but {}x{} {:?} needs {}",
            len, width, height, format, expected
        )));
    }
    Ok(())
}

/// A 2-D point in pixel coordinates.
///
/// Points produced by the contour tracer have integral values; frame-space
/// points become fractional after rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Enclosed area of a closed point sequence by the shoelace formula
/// (absolute value, closure from last point back to first implied).
fn shoelace_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y;
        twice_area -= points[j].x * points[i].y;
    }
    twice_area.abs() / 2.0
}

/// One closed boundary traced from an edge map.
///
/// Points are ordered along the boundary; the curve is implicitly closed
/// from the last point back to the first. A frame may yield zero to many
/// contours, with no ordering guarantee among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Enclosed area (shoelace formula, absolute value).
    pub fn area(&self) -> f32 {
        shoelace_area(&self.points)
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0f32;
        for i in 0..n {
            let j = (i + 1) % n;
            total += self.points[i].distance(&self.points[j]);
        }
        total
    }
}

/// A simplified approximation of a [`Contour`] with fewer vertices.
///
/// Simplicity (non-self-intersection) is not enforced; the area is only
/// meaningful for simple shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Enclosed area (shoelace formula, absolute value).
    pub fn area(&self) -> f32 {
        shoelace_area(&self.points)
    }
}

/// A quadrilateral in working-resolution space: exactly four vertices,
/// ordered as traced along the source contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Build from a simplified polygon. Returns `None` unless the polygon
    /// has exactly four vertices.
    pub fn from_polygon(polygon: &Polygon) -> Option<Self> {
        match *polygon.points.as_slice() {
            [a, b, c, d] => Some(Self { points: [a, b, c, d] }),
            _ => None,
        }
    }

    /// Enclosed area (shoelace formula, absolute value).
    pub fn area(&self) -> f32 {
        shoelace_area(&self.points)
    }
}

/// Per-frame output of the detection pipeline, in working-resolution
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DetectionResult {
    /// No document boundary was found in this frame. This is the normal
    /// "nothing to show" result, not an error.
    NoDocument,
    /// The most plausible document quadrilateral.
    Document(Quad),
}

impl DetectionResult {
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

/// The detected quadrilateral remapped into original-frame pixel
/// coordinates.
///
/// This is the only artifact handed to the overlay renderer. The renderer
/// connects the points in order and closes the loop back to the first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledPolygon {
    pub points: [Point; 4],
}

impl ScaledPolygon {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }
}

/// Physical document targets the user can align against.
///
/// The Brazilian identity documents keep their registry names: RG (identity
/// card), CPF (taxpayer card), CNH (driver's licence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    A4,
    Rg,
    Cpf,
    Cnh,
    Custom { width_mm: u32, height_mm: u32 },
}

impl DocumentKind {
    /// Physical dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Rg => (96, 65),
            Self::Cpf => (66, 99),
            Self::Cnh => (85, 60),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Width over height of the physical document.
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.dimensions_mm();
        w as f32 / h.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_short_buffer() {
        let result = Frame::new(vec![0u8; 10], 4, 4, PixelFormat::Rgba8);
        assert!(matches!(result, Err(KantwerkError::InvalidFrame(_))));
    }

    #[test]
    fn frame_accepts_exact_buffer() {
        let frame =
            Frame::new(vec![0u8; 4 * 4 * 4], 4, 4, PixelFormat::Rgba8).expect("valid frame");
        let view = frame.view();
        assert_eq!(view.width, 4);
        assert_eq!(view.height, 4);
        assert!(!view.is_empty());
    }

    #[test]
    fn rgb_frame_uses_three_bytes_per_pixel() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, PixelFormat::Rgb8).expect("valid frame");
        assert_eq!(frame.format.bytes_per_pixel(), 3);
    }

    #[test]
    fn zero_area_view_is_empty() {
        let view = FrameView::new(&[], 0, 0, PixelFormat::Rgba8).expect("zero-area view");
        assert!(view.is_empty());
    }

    #[test]
    fn bgra_offsets_swap_red_and_blue() {
        assert_eq!(PixelFormat::Bgra8.rgb_offsets(), (2, 1, 0));
        assert_eq!(PixelFormat::Rgba8.rgb_offsets(), (0, 1, 2));
    }

    #[test]
    fn contour_area_of_axis_aligned_square() {
        let contour = Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert!((contour.area() - 100.0).abs() < 1e-3);
        assert!((contour.perimeter() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn quad_from_polygon_requires_four_vertices() {
        let triangle = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ]);
        assert!(Quad::from_polygon(&triangle).is_none());

        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ]);
        let quad = Quad::from_polygon(&square).expect("four vertices");
        assert!((quad.area() - 16.0).abs() < 1e-3);
    }

    #[test]
    fn document_kind_dimensions() {
        assert_eq!(DocumentKind::A4.dimensions_mm(), (210, 297));
        assert_eq!(DocumentKind::Rg.dimensions_mm(), (96, 65));
        let custom = DocumentKind::Custom {
            width_mm: 100,
            height_mm: 50,
        };
        assert!((custom.aspect_ratio() - 2.0).abs() < 1e-6);
    }
}
