// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale morphology. Opening removes bright specks smaller than the
// structuring element, closing fills dark pits, and the two together keep
// document edges while discarding texture noise.

use image::{GrayImage, Luma};

/// Morphological opening: erosion followed by dilation.
pub fn open(image: &GrayImage, kernel_size: u32) -> GrayImage {
    dilate(&erode(image, kernel_size), kernel_size)
}

/// Morphological closing: dilation followed by erosion.
pub fn close(image: &GrayImage, kernel_size: u32) -> GrayImage {
    erode(&dilate(image, kernel_size), kernel_size)
}

/// Window minimum over the structuring element.
///
/// A `k`-sided square element anchors at index `k / 2`, so erosion samples
/// offsets `-k/2 ..= k-1-k/2`.
fn erode(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let k = kernel_size as i32;
    window_fold(image, -(k / 2), k - 1 - k / 2, u8::min, u8::MAX)
}

/// Window maximum over the reflected structuring element.
///
/// Dilation samples the reflected offset range `-(k-1-k/2) ..= k/2`, which
/// makes it the adjoint of [`erode`]; opening and closing then introduce no
/// net shift even for even-sided elements.
fn dilate(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let k = kernel_size as i32;
    window_fold(image, -(k - 1 - k / 2), k / 2, u8::max, u8::MIN)
}

/// Fold every in-bounds sample of the window `lo..=hi` (both axes) into an
/// accumulator. Out-of-bounds samples are skipped, which leaves borders of a
/// uniform image unchanged.
fn window_fold(
    image: &GrayImage,
    lo: i32,
    hi: i32,
    fold: fn(u8, u8) -> u8,
    identity: u8,
) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as i32;
    let h = height as i32;
    let mut out = GrayImage::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = identity;
            for dy in lo..=hi {
                let sy = y + dy;
                if sy < 0 || sy >= h {
                    continue;
                }
                for dx in lo..=hi {
                    let sx = x + dx;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    acc = fold(acc, image.get_pixel(sx as u32, sy as u32).0[0]);
                }
            }
            out.put_pixel(x as u32, y as u32, Luma([acc]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn open_removes_small_specks() {
        let mut image = blank(12, 12, 0);
        for y in 5..7 {
            for x in 5..7 {
                image.put_pixel(x, y, Luma([255]));
            }
        }
        let opened = open(&image, 4);
        assert!(opened.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn open_keeps_large_structures_in_place() {
        let mut image = blank(16, 16, 0);
        for y in 4..12 {
            for x in 4..12 {
                image.put_pixel(x, y, Luma([255]));
            }
        }
        let opened = open(&image, 4);
        assert_eq!(opened, image);
    }

    #[test]
    fn close_fills_small_holes() {
        let mut image = blank(12, 12, 255);
        image.put_pixel(6, 6, Luma([0]));
        let closed = close(&image, 4);
        assert!(closed.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn opening_is_idempotent() {
        let mut image = blank(20, 20, 10);
        for y in 3..15 {
            for x in 6..18 {
                image.put_pixel(x, y, Luma([200]));
            }
        }
        let once = open(&image, 4);
        let twice = open(&once, 4);
        assert_eq!(once, twice);
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let image = blank(8, 8, 128);
        assert_eq!(open(&image, 4), image);
        assert_eq!(close(&image, 4), image);
    }
}
