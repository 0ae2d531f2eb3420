// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay renderer — paints the detected boundary onto a frame: translucent
// interior fill, stroked edges, L-shaped corner markers, and the document
// alignment guide shown while nothing is detected.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::types::{DocumentKind, Point, ScaledPolygon};
use tracing::{debug, instrument};

use crate::style::OverlayStyle;

/// Fraction of the available canvas span the alignment guide occupies.
const GUIDE_FRACTION: f32 = 0.8;

/// Paints detection overlays onto RGBA frames.
///
/// The renderer holds an immutable [`OverlayStyle`] and no other state, so
/// one instance can serve every frame of a session.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    // -- Construction ---------------------------------------------------------

    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    // -- Rendering ------------------------------------------------------------

    /// Paint the detected boundary onto `canvas`.
    ///
    /// The interior is filled with the translucent fill colour, the four
    /// edges are stroked at `stroke_width`, and each vertex gets corner
    /// marker arms running along its two adjacent edges. Vertices outside
    /// the canvas are clipped, never an error.
    #[instrument(skip(self, canvas, polygon), fields(width = canvas.width(), height = canvas.height()))]
    pub fn render(&self, canvas: &mut RgbaImage, polygon: &ScaledPolygon) -> Result<()> {
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(KantwerkError::Render(
                "cannot render into a zero-area canvas".to_string(),
            ));
        }

        fill_polygon(canvas, &polygon.points, self.style.fill_color);

        // Stroke edges and corner markers into one coverage mask first, so
        // overlapping strokes blend into the canvas exactly once.
        let mut mask = vec![false; width as usize * height as usize];
        let edge_radius = brush_radius(self.style.stroke_width);
        for i in 0..4 {
            stamp_segment(
                &mut mask,
                width,
                height,
                polygon.points[i],
                polygon.points[(i + 1) % 4],
                edge_radius,
            );
        }

        let marker_radius = brush_radius(self.style.stroke_width * 2);
        let reach = self.style.corner_length as f32;
        for i in 0..4 {
            let vertex = polygon.points[i];
            let previous = polygon.points[(i + 3) % 4];
            let next = polygon.points[(i + 1) % 4];
            stamp_segment(
                &mut mask,
                width,
                height,
                vertex,
                arm_end(vertex, previous, reach),
                marker_radius,
            );
            stamp_segment(
                &mut mask,
                width,
                height,
                vertex,
                arm_end(vertex, next, reach),
                marker_radius,
            );
        }

        for y in 0..height {
            for x in 0..width {
                if mask[(y * width + x) as usize] {
                    blend(canvas.get_pixel_mut(x, y), self.style.stroke_color);
                }
            }
        }

        debug!("Overlay rendered");
        Ok(())
    }

    /// Paint the centred alignment rectangle for `kind`.
    ///
    /// The rectangle keeps the document's aspect ratio and fits within 80%
    /// of the canvas in both directions. A kind with degenerate dimensions
    /// draws nothing.
    #[instrument(skip(self, canvas), fields(width = canvas.width(), height = canvas.height(), kind = ?kind))]
    pub fn render_guide(&self, canvas: &mut RgbaImage, kind: DocumentKind) -> Result<()> {
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(KantwerkError::Render(
                "cannot render into a zero-area canvas".to_string(),
            ));
        }

        let aspect = kind.aspect_ratio();
        let max_w = width as f32 * GUIDE_FRACTION;
        let max_h = height as f32 * GUIDE_FRACTION;
        let rect_w = max_w.min(max_h * aspect) as u32;
        let rect_h = max_h.min(max_w / aspect) as u32;
        if rect_w < 2 || rect_h < 2 {
            debug!(rect_w, rect_h, "Guide rectangle degenerate, skipping");
            return Ok(());
        }

        let x0 = (width - rect_w) / 2;
        let y0 = (height - rect_h) / 2;
        let colour = Rgba(self.style.stroke_color);
        // Nested hollow rectangles build up the stroke thickness.
        for inset in 0..self.style.stroke_width {
            let shrink = inset * 2;
            if rect_w <= shrink + 1 || rect_h <= shrink + 1 {
                break;
            }
            let rect = Rect::at((x0 + inset) as i32, (y0 + inset) as i32)
                .of_size(rect_w - shrink, rect_h - shrink);
            draw_hollow_rect_mut(canvas, rect, colour);
        }

        debug!(x0, y0, rect_w, rect_h, "Alignment guide rendered");
        Ok(())
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

// -- Pixel helpers ------------------------------------------------------------

/// Alpha-blend `colour` over one canvas pixel (integer source-over).
fn blend(dst: &mut Rgba<u8>, colour: [u8; 4]) {
    let alpha = colour[3] as u32;
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let src = colour[channel] as u32;
        let cur = dst[channel] as u32;
        dst[channel] = ((src * alpha + cur * inverse + 127) / 255) as u8;
    }
    dst[3] = dst[3].max(colour[3]);
}

/// Even-odd scanline fill of a closed 4-gon, clipped to the canvas.
fn fill_polygon(canvas: &mut RgbaImage, points: &[Point; 4], colour: [u8; 4]) {
    let width = canvas.width();
    let height = canvas.height();
    let top = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let bottom = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    let min_y = top.floor().max(0.0) as i64;
    let max_y = bottom.ceil().min((height - 1) as f32) as i64;

    for y in min_y..=max_y {
        // Sample mid-row so integer vertices never land exactly on the
        // scanline and double-count.
        let scan = y as f32 + 0.5;
        let mut crossings: Vec<f32> = Vec::with_capacity(4);
        for i in 0..4 {
            let a = points[i];
            let b = points[(i + 1) % 4];
            if (a.y <= scan && b.y > scan) || (b.y <= scan && a.y > scan) {
                let t = (scan - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|left, right| left.total_cmp(right));
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as i64;
            let end = pair[1].round().min((width - 1) as f32) as i64;
            for x in start..=end {
                blend(canvas.get_pixel_mut(x as u32, y as u32), colour);
            }
        }
    }
}

/// Stamp a square brush along the segment into the coverage mask.
fn stamp_segment(mask: &mut [bool], width: u32, height: u32, from: Point, to: Point, radius: i32) {
    let steps = (from.distance(&to) * 2.0).ceil().max(1.0) as i32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let cx = (from.x + (to.x - from.x) * t).round() as i32;
        let cy = (from.y + (to.y - from.y) * t).round() as i32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = cx + dx;
                let y = cy + dy;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    mask[(y as u32 * width + x as u32) as usize] = true;
                }
            }
        }
    }
}

/// The point `length` pixels from `from` along the direction of `towards`,
/// clamped to the segment.
fn arm_end(from: Point, towards: Point, length: f32) -> Point {
    let dx = towards.x - from.x;
    let dy = towards.y - from.y;
    let span = (dx * dx + dy * dy).sqrt();
    if span <= f32::EPSILON {
        return from;
    }
    let scale = length.min(span) / span;
    Point::new(from.x + dx * scale, from.y + dy * scale)
}

/// Half-width of the square brush for a given stroke width.
fn brush_radius(stroke_width: u32) -> i32 {
    (stroke_width.saturating_sub(1) / 2) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const STROKE: Rgba<u8> = Rgba([70, 130, 180, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn rectangle_polygon() -> ScaledPolygon {
        ScaledPolygon::new([
            Point::new(20.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(80.0, 60.0),
            Point::new(20.0, 60.0),
        ])
    }

    fn black_canvas(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, BLACK)
    }

    #[test]
    fn fill_blends_translucent_colour_over_the_interior() {
        let mut canvas = black_canvas(100, 80);
        let renderer = OverlayRenderer::default();
        renderer
            .render(&mut canvas, &rectangle_polygon())
            .expect("render");
        // [176, 224, 230] at alpha 77 over black.
        assert_eq!(*canvas.get_pixel(50, 40), Rgba([53, 68, 69, 255]));
    }

    #[test]
    fn stroke_covers_the_boundary_band() {
        let mut canvas = black_canvas(100, 80);
        let renderer = OverlayRenderer::default();
        renderer
            .render(&mut canvas, &rectangle_polygon())
            .expect("render");
        // Width 3 centred on the top edge at y = 20.
        assert_eq!(*canvas.get_pixel(50, 19), STROKE);
        assert_eq!(*canvas.get_pixel(50, 20), STROKE);
        assert_eq!(*canvas.get_pixel(50, 21), STROKE);
        // Mid-edge pixels two rows out are neither stroke nor fill.
        assert_eq!(*canvas.get_pixel(50, 17), BLACK);
    }

    #[test]
    fn corner_markers_are_thicker_than_the_edge_stroke() {
        let mut canvas = black_canvas(100, 80);
        let renderer = OverlayRenderer::default();
        renderer
            .render(&mut canvas, &rectangle_polygon())
            .expect("render");
        // The arm from (20, 20) towards (80, 20) reaches x = 40 with a
        // wider brush, so y = 18 is covered near the corner but not at the
        // middle of the edge.
        assert_eq!(*canvas.get_pixel(30, 18), STROKE);
        assert_eq!(*canvas.get_pixel(50, 18), BLACK);
    }

    #[test]
    fn out_of_canvas_corners_clip_without_panicking() {
        let mut canvas = black_canvas(200, 100);
        let polygon = ScaledPolygon::new([
            Point::new(-50.0, -50.0),
            Point::new(250.0, -50.0),
            Point::new(250.0, 150.0),
            Point::new(-50.0, 150.0),
        ]);
        OverlayRenderer::default()
            .render(&mut canvas, &polygon)
            .expect("render");
        // Every canvas pixel sits inside the polygon; the strokes are all
        // outside, so the fill blend is visible everywhere.
        assert_eq!(*canvas.get_pixel(100, 50), Rgba([53, 68, 69, 255]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([53, 68, 69, 255]));
    }

    #[test]
    fn zero_area_canvas_is_rejected() {
        let mut canvas = RgbaImage::new(0, 0);
        let result = OverlayRenderer::default().render(&mut canvas, &rectangle_polygon());
        assert!(matches!(result, Err(KantwerkError::Render(_))));
        let result = OverlayRenderer::default().render_guide(&mut canvas, DocumentKind::A4);
        assert!(matches!(result, Err(KantwerkError::Render(_))));
    }

    #[test]
    fn render_does_not_mutate_the_style() {
        let renderer = OverlayRenderer::default();
        let before = renderer.style().clone();
        let mut canvas = black_canvas(100, 80);
        renderer
            .render(&mut canvas, &rectangle_polygon())
            .expect("render");
        renderer
            .render_guide(&mut canvas, DocumentKind::Cnh)
            .expect("render guide");
        assert_eq!(renderer.style(), &before);
    }

    #[test]
    fn guide_rectangle_is_centred_with_document_aspect() {
        let mut canvas = black_canvas(200, 100);
        OverlayRenderer::default()
            .render_guide(&mut canvas, DocumentKind::A4)
            .expect("render guide");
        // A4 on a 200x100 canvas: 56x80 guide at (72, 10), stroke width 3.
        assert_eq!(*canvas.get_pixel(72, 50), STROKE);
        assert_eq!(*canvas.get_pixel(74, 50), STROKE);
        assert_eq!(*canvas.get_pixel(71, 50), BLACK);
        assert_eq!(*canvas.get_pixel(75, 50), BLACK);
        assert_eq!(*canvas.get_pixel(100, 10), STROKE);
        assert_eq!(*canvas.get_pixel(100, 12), STROKE);
        assert_eq!(*canvas.get_pixel(100, 13), BLACK);
        // The interior stays untouched.
        assert_eq!(*canvas.get_pixel(100, 50), BLACK);
    }

    #[test]
    fn degenerate_custom_kind_draws_nothing() {
        let mut canvas = black_canvas(200, 100);
        OverlayRenderer::default()
            .render_guide(
                &mut canvas,
                DocumentKind::Custom {
                    width_mm: 0,
                    height_mm: 100,
                },
            )
            .expect("render guide");
        assert_eq!(*canvas.get_pixel(100, 50), BLACK);
        assert_eq!(*canvas.get_pixel(72, 50), BLACK);
    }
}
