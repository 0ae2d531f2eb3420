// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing stage. Scales each incoming frame to the working width and
// converts it to a single-channel intensity image.

use image::{GrayImage, Luma};
use kantwerk_core::types::FrameView;
use tracing::{debug, instrument};

/// Scales frames to working resolution and converts them to intensity.
///
/// Every later stage operates on the output of this one, so the ratio it
/// reports is the single source of truth for mapping detection results back
/// into original-frame coordinates.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    working_width: u32,
}

impl Preprocessor {
    pub fn new(working_width: u32) -> Self {
        Self { working_width }
    }

    /// Produce the working-resolution intensity image together with the
    /// width ratio (`working_width / frame.width`) applied to reach it.
    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn run(&self, frame: &FrameView<'_>) -> (GrayImage, f32) {
        let ratio = self.working_width as f32 / frame.width as f32;
        let target_height = ((frame.height as f32 * ratio).round() as u32).max(1);
        let intensity = to_intensity(frame);
        let scaled = if frame.width == self.working_width {
            intensity
        } else if ratio < 1.0 {
            resize_area(&intensity, self.working_width, target_height)
        } else {
            // Frames narrower than the working width are scaled up.
            resize_bilinear(&intensity, self.working_width, target_height)
        };
        debug!(
            working_width = scaled.width(),
            working_height = scaled.height(),
            ratio,
            "Frame preprocessed"
        );
        (scaled, ratio)
    }
}

// -- Intensity conversion -----------------------------------------------------

/// Rec.601 luma in 8-bit fixed point, honouring the frame's channel order.
fn to_intensity(frame: &FrameView<'_>) -> GrayImage {
    let (r_off, g_off, b_off) = frame.format.rgb_offsets();
    let bpp = frame.format.bytes_per_pixel();
    let stride = frame.width as usize * bpp;
    let mut out = GrayImage::new(frame.width, frame.height);
    for y in 0..frame.height {
        let row = y as usize * stride;
        for x in 0..frame.width {
            let base = row + x as usize * bpp;
            let r = frame.pixels[base + r_off] as u32;
            let g = frame.pixels[base + g_off] as u32;
            let b = frame.pixels[base + b_off] as u32;
            // 77/150/29 are the luma weights 0.299/0.587/0.114 scaled by 256.
            let luma = ((77 * r + 150 * g + 29 * b + 128) >> 8) as u8;
            out.put_pixel(x, y, Luma([luma]));
        }
    }
    out
}

// -- Resampling ---------------------------------------------------------------

/// Box-filter downscale. Each output pixel averages the source pixels its
/// footprint covers, weighting partially covered pixels by their overlap.
fn resize_area(src: &GrayImage, dst_width: u32, dst_height: u32) -> GrayImage {
    let (src_width, src_height) = src.dimensions();
    let x_scale = src_width as f32 / dst_width as f32;
    let y_scale = src_height as f32 / dst_height as f32;
    let mut out = GrayImage::new(dst_width, dst_height);
    for dy in 0..dst_height {
        let y0 = dy as f32 * y_scale;
        let y1 = (dy as f32 + 1.0) * y_scale;
        let sy_first = y0.floor() as u32;
        let sy_last = (y1.ceil() as u32).min(src_height);
        for dx in 0..dst_width {
            let x0 = dx as f32 * x_scale;
            let x1 = (dx as f32 + 1.0) * x_scale;
            let sx_first = x0.floor() as u32;
            let sx_last = (x1.ceil() as u32).min(src_width);
            let mut sum = 0.0f32;
            let mut coverage = 0.0f32;
            for sy in sy_first..sy_last {
                let overlap_y = ((sy as f32 + 1.0).min(y1) - (sy as f32).max(y0)).max(0.0);
                for sx in sx_first..sx_last {
                    let overlap_x = ((sx as f32 + 1.0).min(x1) - (sx as f32).max(x0)).max(0.0);
                    let weight = overlap_x * overlap_y;
                    sum += weight * src.get_pixel(sx, sy).0[0] as f32;
                    coverage += weight;
                }
            }
            let value = if coverage > 0.0 { sum / coverage } else { 0.0 };
            out.put_pixel(dx, dy, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Bilinear resample with pixel-centre alignment, used when scaling up.
fn resize_bilinear(src: &GrayImage, dst_width: u32, dst_height: u32) -> GrayImage {
    let (src_width, src_height) = src.dimensions();
    let x_scale = src_width as f32 / dst_width as f32;
    let y_scale = src_height as f32 / dst_height as f32;
    let mut out = GrayImage::new(dst_width, dst_height);
    for dy in 0..dst_height {
        let sy = ((dy as f32 + 0.5) * y_scale - 0.5).clamp(0.0, (src_height - 1) as f32);
        let y0 = sy.floor() as u32;
        let y1 = (y0 + 1).min(src_height - 1);
        let fy = sy - y0 as f32;
        for dx in 0..dst_width {
            let sx = ((dx as f32 + 0.5) * x_scale - 0.5).clamp(0.0, (src_width - 1) as f32);
            let x0 = sx.floor() as u32;
            let x1 = (x0 + 1).min(src_width - 1);
            let fx = sx - x0 as f32;
            let top = lerp(
                src.get_pixel(x0, y0).0[0] as f32,
                src.get_pixel(x1, y0).0[0] as f32,
                fx,
            );
            let bottom = lerp(
                src.get_pixel(x0, y1).0[0] as f32,
                src.get_pixel(x1, y1).0[0] as f32,
                fx,
            );
            let value = lerp(top, bottom, fy);
            out.put_pixel(dx, dy, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use kantwerk_core::types::PixelFormat;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height) as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        pixels
    }

    #[test]
    fn output_matches_working_width() {
        let pixels = solid_frame(100, 80, [200, 200, 200, 255]);
        let view = FrameView::new(&pixels, 100, 80, PixelFormat::Rgba8).expect("valid view");
        let (gray, ratio) = Preprocessor::new(50).run(&view);
        assert_eq!(gray.dimensions(), (50, 40));
        assert!((ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn luma_weights_follow_channel_order() {
        // The same bytes read as RGBA vs BGRA must give different intensity.
        let pixels = solid_frame(4, 4, [255, 0, 0, 255]);
        let rgba = FrameView::new(&pixels, 4, 4, PixelFormat::Rgba8).expect("valid view");
        let bgra = FrameView::new(&pixels, 4, 4, PixelFormat::Bgra8).expect("valid view");
        let pre = Preprocessor::new(4);
        let (as_red, _) = pre.run(&rgba);
        let (as_blue, _) = pre.run(&bgra);
        assert_eq!(as_red.get_pixel(0, 0).0[0], 77);
        assert_eq!(as_blue.get_pixel(0, 0).0[0], 29);
    }

    #[test]
    fn rgb_frames_use_three_byte_pixels() {
        let mut pixels = Vec::new();
        for _ in 0..16 {
            pixels.extend_from_slice(&[0, 255, 0]);
        }
        let view = FrameView::new(&pixels, 4, 4, PixelFormat::Rgb8).expect("valid view");
        let (gray, _) = Preprocessor::new(4).run(&view);
        assert_eq!(gray.get_pixel(2, 2).0[0], 149);
    }

    #[test]
    fn area_downscale_averages_coverage() {
        // Two source pixels of intensity 100 and 200 collapse into one.
        let mut pixels = Vec::new();
        pixels.extend_from_slice(&[100, 100, 100, 255]);
        pixels.extend_from_slice(&[200, 200, 200, 255]);
        let view = FrameView::new(&pixels, 2, 1, PixelFormat::Rgba8).expect("valid view");
        let (gray, _) = Preprocessor::new(1).run(&view);
        assert_eq!(gray.dimensions(), (1, 1));
        assert_eq!(gray.get_pixel(0, 0).0[0], 150);
    }

    #[test]
    fn narrow_frames_scale_up() {
        let pixels = solid_frame(10, 10, [50, 50, 50, 255]);
        let view = FrameView::new(&pixels, 10, 10, PixelFormat::Rgba8).expect("valid view");
        let (gray, ratio) = Preprocessor::new(20).run(&view);
        assert_eq!(gray.dimensions(), (20, 20));
        assert!((ratio - 2.0).abs() < 1e-6);
        assert_eq!(gray.get_pixel(10, 10).0[0], 50);
    }
}
