// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral selection. Filters traced contours by enclosed area,
// simplifies the survivors and keeps the largest one, which is accepted
// only if it simplified to exactly four corners.

use kantwerk_core::types::{Contour, DetectionResult, Point, Polygon, Quad};
use tracing::{debug, instrument};

/// Picks the most plausible document boundary from a set of contours.
#[derive(Debug, Clone)]
pub struct QuadSelector {
    min_area: f32,
    epsilon_ratio: f32,
}

impl QuadSelector {
    pub fn new(min_area: f32, epsilon_ratio: f32) -> Self {
        Self {
            min_area,
            epsilon_ratio,
        }
    }

    /// Select the largest sufficiently big contour and accept it as a
    /// document when its simplified form has exactly four corners.
    ///
    /// Areas strictly below the minimum are rejected; at-or-above passes.
    /// Ties on area keep the candidate seen first. The four-corner check
    /// applies to the final winner only, so a dominant non-quadrilateral
    /// shape masks smaller quadrilaterals behind it.
    #[instrument(skip(self, contours), fields(contour_count = contours.len()))]
    pub fn select(&self, contours: &[Contour]) -> DetectionResult {
        let mut best: Option<Polygon> = None;
        let mut best_area = 0.0f32;
        for contour in contours {
            let area = contour.area();
            if area < self.min_area {
                continue;
            }
            if best.is_some() && area <= best_area {
                continue;
            }
            let epsilon = self.epsilon_ratio * contour.perimeter();
            best = Some(simplify_closed(&contour.points, epsilon));
            best_area = area;
        }
        let Some(polygon) = best else {
            return DetectionResult::NoDocument;
        };
        match Quad::from_polygon(&polygon) {
            Some(quad) => {
                debug!(area = best_area, "Document candidate selected");
                DetectionResult::Document(quad)
            }
            None => {
                debug!(
                    vertices = polygon.points.len(),
                    area = best_area,
                    "Largest candidate is not a quadrilateral"
                );
                DetectionResult::NoDocument
            }
        }
    }
}

// -- Polygon simplification ---------------------------------------------------

/// Douglas-Peucker over a closed ring.
///
/// The ring is split at the vertex farthest from the first point and the two
/// open halves are simplified independently, then rejoined without the
/// duplicated seam vertices.
fn simplify_closed(points: &[Point], epsilon: f32) -> Polygon {
    if points.len() <= 2 {
        return Polygon::new(points.to_vec());
    }
    let mut far_index = 1;
    let mut far_distance = 0.0f32;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = points[0].distance(p);
        if d > far_distance {
            far_distance = d;
            far_index = i;
        }
    }
    let first_half = &points[..=far_index];
    let mut second_half = points[far_index..].to_vec();
    second_half.push(points[0]);

    let mut joined = douglas_peucker(first_half, epsilon);
    let back = douglas_peucker(&second_half, epsilon);
    joined.pop();
    joined.extend_from_slice(&back[..back.len() - 1]);
    Polygon::new(joined)
}

/// Classic recursive Douglas-Peucker over an open polyline. Endpoints are
/// always kept; interior points survive only if they deviate from the
/// current chord by more than `epsilon`.
fn douglas_peucker(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let mut max_distance = 0.0f32;
    let mut max_index = 0usize;
    for (i, p) in points
        .iter()
        .enumerate()
        .take(points.len() - 1)
        .skip(1)
    {
        let d = perpendicular_distance(p, &first, &last);
        if d > max_distance {
            max_distance = d;
            max_index = i;
        }
    }
    if max_distance > epsilon {
        let mut left = douglas_peucker(&points[..=max_index], epsilon);
        let right = douglas_peucker(&points[max_index..], epsilon);
        left.pop();
        left.extend_from_slice(&right);
        left
    } else {
        vec![first, last]
    }
}

/// Distance from `p` to the line through `a` and `b`; falls back to the
/// point distance when the chord is degenerate.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length < f32::EPSILON {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / length
}
