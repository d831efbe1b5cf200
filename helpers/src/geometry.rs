use serde::{Deserialize, Serialize};

/// Point in the track-local coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// distance returns the Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// of returns the bounding box of the inserted points or `None` for an empty set.
    pub fn of(points: &[Point]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };

        for p in points.iter().skip(1) {
            bbox.x_min = bbox.x_min.min(p.x);
            bbox.x_max = bbox.x_max.max(p.x);
            bbox.y_min = bbox.y_min.min(p.y);
            bbox.y_max = bbox.y_max.max(p.y);
        }

        Some(bbox)
    }

    /// contains checks if the point lies within the box (borders included).
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}

/// point_in_polygon checks if the point lies inside the closed ring using ray casting: an edge
/// toggles the result if it straddles the point's y coordinate and the point lies left of the
/// edge on that scanline.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    let mut inside = false;

    if polygon.is_empty() {
        return inside;
    }

    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let pi = &polygon[i];
        let pj = &polygon[j];

        // division is safe: the straddle condition guarantees pj.y != pi.y
        if (pi.y > p.y) != (pj.y > p.y)
            && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// ring_length returns the length of the closed ring, i.e. including the edge from the last
/// back to the first point. Rings with less than two points have zero length.
pub fn ring_length(ring: &[Point]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }

    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(p, q)| p.distance(q))
        .sum()
}

/// Parameters of the intersection of two lines through the segments `a0-a1` and `b0-b1`.
/// * `lambda` - Location of the intersection on segment a (0 at `a0`, 1 at `a1`)
/// * `gamma` - Location of the intersection on segment b, measured back from `b1` (0 at `b1`,
/// 1 at `b0`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub lambda: f64,
    pub gamma: f64,
}

/// segment_intersection solves the parametric intersection of the lines through both segments.
/// It returns `None` if the lines are parallel (zero determinant). Whether the segments really
/// intersect is left to the caller, who must range-check the returned parameters.
pub fn segment_intersection(
    a0: &Point,
    a1: &Point,
    b0: &Point,
    b1: &Point,
) -> Option<Intersection> {
    let det = (a1.x - a0.x) * (b1.y - b0.y) - (b1.x - b0.x) * (a1.y - a0.y);

    if det == 0.0 {
        return None;
    }

    let lambda = ((b1.y - b0.y) * (b1.x - a0.x) + (b0.x - b1.x) * (b1.y - a0.y)) / det;
    let gamma = ((a0.y - a1.y) * (b1.x - a0.x) + (a1.x - a0.x) * (b1.y - a0.y)) / det;

    Some(Intersection { lambda, gamma })
}
