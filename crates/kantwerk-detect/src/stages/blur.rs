// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gaussian smoothing. Run after morphology so the edge extractor sees soft
// gradients instead of block noise.

use image::{GrayImage, Luma};

/// Separable Gaussian blur with a square `kernel_size` kernel.
///
/// Sigma is derived from the kernel size by `0.3 * ((k - 1) * 0.5 - 1) + 0.8`
/// (1.4 for the default 7x7 kernel). Borders are mirrored without repeating
/// the edge sample.
pub fn gaussian(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel_size / 2) as i32;

    // Horizontal pass into an f32 buffer so rounding happens only once.
    let mut horizontal = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (tap, weight) in kernel.iter().enumerate() {
                let sx = reflect(x as i32 + tap as i32 - radius, width as i32);
                acc += weight * image.get_pixel(sx as u32, y).0[0] as f32;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (tap, weight) in kernel.iter().enumerate() {
                let sy = reflect(y as i32 + tap as i32 - radius, height as i32);
                acc += weight * horizontal[(sy as u32 * width + x) as usize];
            }
            out.put_pixel(x, y, Luma([acc.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Sigma implied by a kernel size, matching the usual kernel-to-sigma rule.
fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian weights for one pass of the separable filter.
fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(kernel_size);
    let radius = (kernel_size / 2) as i32;
    let mut weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    for weight in &mut weights {
        *weight /= total;
    }
    weights
}

/// Mirror an index into `0..len` without repeating the border sample.
fn reflect(index: i32, len: i32) -> i32 {
    if len == 1 {
        return 0;
    }
    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= len {
            i = 2 * len - 2 - i;
        } else {
            return i;
        }
    }
}
