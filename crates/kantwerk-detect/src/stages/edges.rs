// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge extraction. Two-threshold gradient detection over the smoothed
// intensity image, producing a binary edge map for the contour builder.

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

/// Two-threshold gradient edge detector.
///
/// Gradients come from 3x3 Sobel operators with an L1 magnitude. Ridges are
/// thinned by non-maximum suppression along the quantised gradient
/// direction, then kept by hysteresis: magnitudes at or above the high
/// threshold seed an edge, and 8-connected neighbours at or above the low
/// threshold extend it. The output is strictly binary, 0 or 255.
#[derive(Debug, Clone)]
pub struct EdgeExtractor {
    low_threshold: f32,
    high_threshold: f32,
}

impl EdgeExtractor {
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }

    #[instrument(skip(self, image))]
    pub fn run(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let (gx, gy) = sobel_gradients(image);
        let magnitude = suppress_non_maxima(&gx, &gy, width, height);
        let edges = hysteresis(
            &magnitude,
            width,
            height,
            self.low_threshold,
            self.high_threshold,
        );
        let edge_pixels = edges.pixels().filter(|p| p.0[0] != 0).count();
        debug!(edge_pixels, "Edge map extracted");
        edges
    }
}

/// Horizontal and vertical Sobel responses; borders are sampled clamped.
fn sobel_gradients(image: &GrayImage) -> (Vec<f32>, Vec<f32>) {
    let (width, height) = image.dimensions();
    let w = width as i32;
    let h = height as i32;
    let sample = |x: i32, y: i32| -> f32 {
        let cx = x.clamp(0, w - 1) as u32;
        let cy = y.clamp(0, h - 1) as u32;
        image.get_pixel(cx, cy).0[0] as f32
    };
    let mut gx = vec![0.0f32; (width * height) as usize];
    let mut gy = vec![0.0f32; (width * height) as usize];
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let tl = sample(x - 1, y - 1);
            let top = sample(x, y - 1);
            let tr = sample(x + 1, y - 1);
            let left = sample(x - 1, y);
            let right = sample(x + 1, y);
            let bl = sample(x - 1, y + 1);
            let bottom = sample(x, y + 1);
            let br = sample(x + 1, y + 1);
            gx[idx] = (tr + 2.0 * right + br) - (tl + 2.0 * left + bl);
            gy[idx] = (bl + 2.0 * bottom + br) - (tl + 2.0 * top + tr);
        }
    }
    (gx, gy)
}

/// Keep only pixels that are local maxima along their gradient direction,
/// with the direction quantised to four sectors.
fn suppress_non_maxima(gx: &[f32], gy: &[f32], width: u32, height: u32) -> Vec<f32> {
    let w = width as i32;
    let h = height as i32;
    let magnitude: Vec<f32> = gx.iter().zip(gy).map(|(a, b)| a.abs() + b.abs()).collect();
    let at = |x: i32, y: i32| -> f32 {
        if x < 0 || x >= w || y < 0 || y >= h {
            0.0
        } else {
            magnitude[(y * w + x) as usize]
        }
    };
    let mut out = vec![0.0f32; magnitude.len()];
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let m = magnitude[idx];
            if m == 0.0 {
                continue;
            }
            let mut angle = gy[idx].atan2(gx[idx]).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            let (n1, n2) = if !(22.5..157.5).contains(&angle) {
                (at(x - 1, y), at(x + 1, y))
            } else if angle < 67.5 {
                (at(x - 1, y - 1), at(x + 1, y + 1))
            } else if angle < 112.5 {
                (at(x, y - 1), at(x, y + 1))
            } else {
                (at(x - 1, y + 1), at(x + 1, y - 1))
            };
            if m >= n1 && m >= n2 {
                out[idx] = m;
            }
        }
    }
    out
}

/// Double threshold with connectivity: strong pixels seed, weak 8-connected
/// neighbours are pulled in with a stack walk.
fn hysteresis(magnitude: &[f32], width: u32, height: u32, low: f32, high: f32) -> GrayImage {
    let w = width as i32;
    let h = height as i32;
    let mut out = GrayImage::new(width, height);
    let mut visited = vec![false; magnitude.len()];
    let mut stack = Vec::new();
    for seed in 0..magnitude.len() {
        if magnitude[seed] < high || visited[seed] {
            continue;
        }
        visited[seed] = true;
        stack.push(seed);
        while let Some(idx) = stack.pop() {
            let x = idx as i32 % w;
            let y = idx as i32 / w;
            out.put_pixel(x as u32, y as u32, Luma([255]));
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || nx >= w || ny < 0 || ny >= h {
                        continue;
                    }
                    let nidx = (ny * w + nx) as usize;
                    if !visited[nidx] && magnitude[nidx] >= low {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
    }
    out
}
