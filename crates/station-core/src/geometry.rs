//! Planar geometry for the station floor.
//!
//! All coordinates are single-precision: the simulated concourse is a few
//! hundred metres across, so `f32` gives sub-millimetre resolution while
//! keeping per-agent state compact.

/// A point (or free vector) on the station floor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance from `self` to the segment `[s1, s2]`, together with the
    /// closest point on the segment.
    ///
    /// When the orthogonal projection falls outside the segment the closest
    /// vertex is returned; a degenerate segment (both endpoints equal) is
    /// treated as a point.
    pub fn distance_projection(self, s1: Point2D, s2: Point2D) -> (f32, Point2D) {
        let dx = s2.x - s1.x;
        let dy = s2.y - s1.y;
        let length_squared = dx * dx + dy * dy;

        if length_squared == 0.0 {
            return (self.distance(s1), s1);
        }

        let t = (((self.x - s1.x) * dx + (self.y - s1.y) * dy) / length_squared).clamp(0.0, 1.0);
        let projection = Point2D::new(s1.x + t * dx, s1.y + t * dy);
        (self.distance(projection), projection)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Polygon membership ────────────────────────────────────────────────────────

/// `true` if `location` falls outside the polygon described by `vertices`.
///
/// Even-odd (crossing-number) rule, so self-intersecting vertex orderings
/// behave like the shape they draw rather than their bounding box: the
/// hourglass `[(0,0),(4,4),(0,4),(4,0)]` excludes the left and right lobes
/// of the square with the same vertices.
pub fn is_outside_polygon(vertices: &[Point2D], location: Point2D) -> bool {
    if vertices.len() < 3 {
        return true;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];

        // Edge straddles the horizontal ray through `location`.
        if (vi.y > location.y) != (vj.y > location.y) {
            let x_cross = vi.x + (location.y - vi.y) * (vj.x - vi.x) / (vj.y - vi.y);
            if location.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    !inside
}

/// Clamp `location` into the axis-aligned bounding box of `vertices`.
///
/// Used after a wiggle or an accepted move that would leave the walkable
/// area: agents are pushed back to the nearest wall rather than escaping.
pub fn clip_to_bounds(vertices: &[Point2D], location: Point2D) -> Point2D {
    if vertices.is_empty() {
        return location;
    }

    let mut min = Point2D::new(f32::INFINITY, f32::INFINITY);
    let mut max = Point2D::new(f32::NEG_INFINITY, f32::NEG_INFINITY);

    for vertex in vertices {
        min.x = min.x.min(vertex.x);
        min.y = min.y.min(vertex.y);
        max.x = max.x.max(vertex.x);
        max.y = max.y.max(vertex.y);
    }

    Point2D::new(location.x.clamp(min.x, max.x), location.y.clamp(min.y, max.y))
}
