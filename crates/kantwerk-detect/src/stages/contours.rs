// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour building. Walks every closed boundary in a binary edge map and
// compresses each chain to its direction-changing points.

use std::collections::HashSet;

use image::GrayImage;
use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::types::{Contour, Point};
use tracing::{debug, instrument};

/// 8-neighbourhood offsets in clockwise order, starting from west.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Trace every boundary in the edge map as a flat list, with no hierarchy
/// and no ordering guarantee among contours.
///
/// Starts are found by raster scan: an edge pixel whose west neighbour is
/// background opens a new boundary unless an earlier trace already walked
/// through it. Open curve fragments come back as flattened out-and-back
/// chains with near-zero enclosed area.
#[instrument(skip(edges))]
pub fn trace_contours(edges: &GrayImage) -> Result<Vec<Contour>> {
    let (width, height) = edges.dimensions();
    let w = width as i32;
    let h = height as i32;
    let mut visited = vec![false; (width * height) as usize];
    let mut contours = Vec::new();
    // Any single boundary walk is shorter than this; exceeding it means the
    // tracer lost its invariant.
    let max_steps = width as usize * height as usize * 4 + 8;

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] || !is_edge(edges, x, y) || is_edge(edges, x - 1, y) {
                continue;
            }
            let chain = trace_boundary(edges, &mut visited, (x, y), max_steps)?;
            contours.push(Contour::new(compress_chain(&chain)));
        }
    }
    debug!(contour_count = contours.len(), "Contours traced");
    Ok(contours)
}

/// Moore neighbour walk from one start pixel.
///
/// The walk state is the pair (current pixel, backtrack pixel). It stops
/// when a state repeats, which closes exactly one full cycle around the
/// boundary; a plain visited-start check would run forever on open
/// diagonal fragments whose initial state never recurs.
fn trace_boundary(
    edges: &GrayImage,
    visited: &mut [bool],
    start: (i32, i32),
    max_steps: usize,
) -> Result<Vec<(i32, i32)>> {
    let w = edges.width() as i32;
    let mut chain = vec![start];
    visited[(start.1 * w + start.0) as usize] = true;

    // The raster scan entered from the west, so that neighbour is background.
    let mut current = start;
    let mut backtrack = (start.0 - 1, start.1);
    let mut seen: HashSet<((i32, i32), (i32, i32))> = HashSet::new();
    seen.insert((current, backtrack));

    for _ in 0..max_steps {
        let from_dir = direction_of(current, backtrack);
        let mut next_backtrack = backtrack;
        let mut moved = false;
        for offset in 1..=8 {
            let dir = (from_dir + offset) % 8;
            let (dx, dy) = NEIGHBOURS[dir];
            let candidate = (current.0 + dx, current.1 + dy);
            if is_edge(edges, candidate.0, candidate.1) {
                backtrack = next_backtrack;
                current = candidate;
                moved = true;
                break;
            }
            next_backtrack = candidate;
        }
        if !moved {
            // Isolated pixel without edge neighbours.
            return Ok(chain);
        }
        if !seen.insert((current, backtrack)) {
            return Ok(chain);
        }
        chain.push(current);
        visited[(current.1 * w + current.0) as usize] = true;
    }
    Err(KantwerkError::Stage(
        "boundary trace exceeded the maximum chain length".into(),
    ))
}

fn is_edge(edges: &GrayImage, x: i32, y: i32) -> bool {
    x >= 0
        && y >= 0
        && (x as u32) < edges.width()
        && (y as u32) < edges.height()
        && edges.get_pixel(x as u32, y as u32).0[0] != 0
}

/// Direction index of `to` as seen from `from`; the two are adjacent.
fn direction_of(from: (i32, i32), to: (i32, i32)) -> usize {
    let delta = (to.0 - from.0, to.1 - from.1);
    NEIGHBOURS
        .iter()
        .position(|&offset| offset == delta)
        .unwrap_or(0)
}

/// Keep only points where the chain changes direction. Straight runs
/// collapse to their endpoints without altering the traced geometry.
fn compress_chain(chain: &[(i32, i32)]) -> Vec<Point> {
    let n = chain.len();
    if n <= 2 {
        return chain
            .iter()
            .map(|&(x, y)| Point::new(x as f32, y as f32))
            .collect();
    }
    let mut points = Vec::new();
    for i in 0..n {
        let prev = chain[(i + n - 1) % n];
        let here = chain[i];
        let next = chain[(i + 1) % n];
        let incoming = (here.0 - prev.0, here.1 - prev.1);
        let outgoing = (next.0 - here.0, next.1 - here.1);
        if incoming != outgoing {
            points.push(Point::new(here.0 as f32, here.1 as f32));
        }
    }
    if points.is_empty() {
        points.push(Point::new(chain[0].0 as f32, chain[0].1 as f32));
    }
    points
}
