// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the kantwerk-detect crate. Benchmarks the full
// per-frame pipeline on a synthetic camera frame with a clear document shape.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma, Rgba, RgbaImage};

use kantwerk_core::types::{Frame, PixelFormat};
use kantwerk_detect::Detector;
use kantwerk_detect::stages::EdgeExtractor;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark the full detection pipeline on a 640x480 synthetic frame.
///
/// The frame holds a bright axis-aligned rectangle on a dark background,
/// which keeps every stage busy without relying on fixture files. The frame
/// is wider than the default 500 px working width, so the downscale path a
/// camera preview would take is measured too.
fn bench_detect(c: &mut Criterion) {
    let (width, height) = (640u32, 480u32);
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([20, 20, 20, 255]));
    for y in 90..390 {
        for x in 120..520 {
            canvas.put_pixel(x, y, Rgba([235, 235, 235, 255]));
        }
    }
    let frame = Frame::new(canvas.into_raw(), width, height, PixelFormat::Rgba8)
        .expect("valid synthetic frame");
    let detector = Detector::default();

    c.bench_function("detect (640x480)", |b| {
        b.iter(|| {
            let result = detector.detect(black_box(&frame.view()));
            black_box(result).expect("detect");
        });
    });
}

/// Benchmark the edge stage alone at working resolution.
///
/// Gradient computation plus non-maximum suppression dominates the pipeline
/// budget, so this isolates it on a 500x375 intensity image.
fn bench_edges(c: &mut Criterion) {
    let (width, height) = (500u32, 375u32);
    let mut intensity = GrayImage::from_pixel(width, height, Luma([25u8]));
    for y in 70..305 {
        for x in 95..405 {
            intensity.put_pixel(x, y, Luma([230u8]));
        }
    }
    let extractor = EdgeExtractor::new(75.0, 100.0);

    c.bench_function("edges (500x375)", |b| {
        b.iter(|| {
            black_box(extractor.run(black_box(&intensity)));
        });
    });
}

criterion_group!(benches, bench_detect, bench_edges);
criterion_main!(benches);
