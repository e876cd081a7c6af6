//! Planar helpers shared by terrain generation and creature queries.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Angle of the vector from `self` to `other`.
    #[inline]
    pub fn angle_to(&self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Even-odd ray cast. An empty polygon contains nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.is_empty() {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Intersection of the infinite lines through `p1,p2` and `p3,p4`.
/// Returns `None` for (nearly) parallel lines.
pub fn line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let a1 = p2.y - p1.y;
    let b1 = p1.x - p2.x;
    let c1 = a1 * p1.x + b1 * p1.y;
    let a2 = p4.y - p3.y;
    let b2 = p3.x - p4.x;
    let c2 = a2 * p3.x + b2 * p3.y;
    let det = a1 * b2 - a2 * b1;
    if det.abs() < 1e-5 {
        return None;
    }
    Some(Point::new(
        (b2 * c1 - b1 * c2) / det,
        (a1 * c2 - a2 * c1) / det,
    ))
}

/// Keep the part of `polygon` on the side of the line through `origin`
/// that `normal` points into (Sutherland-Hodgman, single edge).
pub fn clip_polygon(polygon: &[Point], origin: Point, normal: Point) -> Vec<Point> {
    let mut output = Vec::with_capacity(polygon.len() + 1);
    if polygon.is_empty() {
        return output;
    }
    let side = |p: Point| (p.x - origin.x) * normal.x + (p.y - origin.y) * normal.y;
    // Second point on the clipping line.
    let along = Point::new(origin.x + normal.y, origin.y - normal.x);

    let mut prev = polygon[polygon.len() - 1];
    for &cur in polygon {
        let cur_side = side(cur);
        let prev_side = side(prev);
        if cur_side >= 0.0 {
            if prev_side < 0.0 {
                if let Some(hit) = line_intersection(prev, cur, origin, along) {
                    output.push(hit);
                }
            }
            output.push(cur);
        } else if prev_side >= 0.0 {
            if let Some(hit) = line_intersection(prev, cur, origin, along) {
                output.push(hit);
            }
        }
        prev = cur;
    }
    output
}

/// Vertex average. `None` for an empty slice.
pub fn centroid(vertices: &[Point]) -> Option<Point> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f32;
    let (sx, sy) = vertices
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Wrap a coordinate onto `[0, extent)`.
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
