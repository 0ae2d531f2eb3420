// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate mapping between working resolution and original-frame space.

use kantwerk_core::types::{Point, Quad, ScaledPolygon};

/// Map a working-resolution quadrilateral back into original-frame pixels.
///
/// Each coordinate is divided by the preprocessing ratio, undoing the
/// downscale exactly. Corners stay in traced order.
pub fn to_frame_space(quad: &Quad, ratio: f32) -> ScaledPolygon {
    ScaledPolygon::new(
        quad.points
            .map(|p| Point::new(p.x / ratio, p.y / ratio)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_ratio_is_exact() {
        let quad = Quad::new([
            Point::new(10.0, 20.0),
            Point::new(110.0, 20.0),
            Point::new(110.0, 90.0),
            Point::new(10.0, 90.0),
        ]);
        let ratio = 0.5;
        let mapped = to_frame_space(&quad, ratio);
        for (mapped, original) in mapped.points.iter().zip(&quad.points) {
            assert_eq!(mapped.x, original.x / ratio);
            assert_eq!(mapped.y, original.y / ratio);
        }
        assert_eq!((mapped.points[0].x, mapped.points[0].y), (20.0, 40.0));
    }

    #[test]
    fn unit_ratio_is_identity() {
        let quad = Quad::new([
            Point::new(1.5, 2.5),
            Point::new(3.5, 2.5),
            Point::new(3.5, 4.5),
            Point::new(1.5, 4.5),
        ]);
        let mapped = to_frame_space(&quad, 1.0);
        assert_eq!(mapped.points.map(|p| (p.x, p.y)), quad.points.map(|p| (p.x, p.y)));
    }

    #[test]
    fn corner_order_is_preserved() {
        let quad = Quad::new([
            Point::new(0.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(8.0, 8.0),
            Point::new(0.0, 8.0),
        ]);
        let mapped = to_frame_space(&quad, 0.25);
        assert_eq!((mapped.points[1].x, mapped.points[1].y), (32.0, 0.0));
        assert_eq!((mapped.points[3].x, mapped.points[3].y), (0.0, 32.0));
    }
}
