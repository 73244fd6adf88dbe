//! Planar geometry kernel
//!
//! Stateless helpers used by the sweep: lines in `a·x + b·y = c` form,
//! bisectors, circumcenters, parabolas against a horizontal sweep line,
//! bounded ray intersection and the bounding frame that finished edges are
//! clipped to.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Tolerance for floating-point comparisons in the sweep predicates
pub(crate) const EPSILON: f64 = 1e-9;

/// A line `a·x + b·y = c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    /// Build a line from its coefficients
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// The line passing through two points
    pub fn through(p1: DVec2, p2: DVec2) -> Self {
        let a = p2.y - p1.y;
        let b = p1.x - p2.x;
        Self {
            a,
            b,
            c: a * p1.x + b * p1.y,
        }
    }
}

/// The line of points equidistant from `p1` and `p2`
pub fn perpendicular_bisector(p1: DVec2, p2: DVec2) -> Line {
    let side = Line::through(p1, p2);
    let midpoint = 0.5 * (p1 + p2);
    Line::new(
        -side.b,
        side.a,
        -side.b * midpoint.x + side.a * midpoint.y,
    )
}

/// Intersect two lines
///
/// # Errors
///
/// Returns `ParallelLines` when the determinant vanishes. Callers treat this
/// as "no intersection".
pub fn intersect_lines(l1: Line, l2: Line) -> Result<DVec2> {
    let det = l1.a * l2.b - l2.a * l1.b;
    let scale = (l1.a.abs() + l1.b.abs()) * (l2.a.abs() + l2.b.abs());
    if det.abs() <= EPSILON * scale || !det.is_finite() {
        return Err(VoronoiError::ParallelLines);
    }
    let x = (l2.b * l1.c - l1.b * l2.c) / det;
    let y = (l1.a * l2.c - l2.a * l1.c) / det;
    Ok(DVec2::new(x, y))
}

/// Center of the circle through three points
///
/// # Errors
///
/// Returns `ParallelLines` for collinear (or coincident) points.
pub fn circumcenter(p1: DVec2, p2: DVec2, p3: DVec2) -> Result<DVec2> {
    let bisector1 = perpendicular_bisector(p1, p2);
    let bisector2 = perpendicular_bisector(p2, p3);
    intersect_lines(bisector1, bisector2)
}

/// Parabola `y = a·x² + b·x + c` of the points equidistant from a focus and
/// the horizontal sweep line below it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Parabola {
    /// Parabola for `focus` against the directrix `y = sweep_y`
    ///
    /// Returns `None` while the focus lies on the sweep line, where the
    /// parabola degenerates into a vertical ray.
    pub fn at_sweep(focus: DVec2, sweep_y: f64) -> Option<Self> {
        let d = 2.0 * (focus.y - sweep_y);
        if d.abs() <= EPSILON {
            return None;
        }
        Some(Self {
            a: 1.0 / d,
            b: -2.0 * focus.x / d,
            c: (focus.x * focus.x + focus.y * focus.y - sweep_y * sweep_y) / d,
        })
    }

    /// Evaluate the parabola at `x`
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }
}

/// X coordinate of the breakpoint between a left arc with focus `left` and a
/// right arc with focus `right` at sweep position `sweep_y`
///
/// Both parabolas cross twice. The focus nearer the sweep line has the
/// narrower parabola, which is the lower one between the crossings, so the
/// beach line reads wide-narrow-wide there. When the left focus is the
/// farther one the left arc hands over at the first crossing, otherwise at
/// the second.
pub fn breakpoint_x(left: DVec2, right: DVec2, sweep_y: f64) -> f64 {
    let dl = left.y - sweep_y;
    let dr = right.y - sweep_y;

    if dl.abs() <= EPSILON && dr.abs() <= EPSILON {
        return 0.5 * (left.x + right.x);
    }
    if dl.abs() <= EPSILON {
        return left.x;
    }
    if dr.abs() <= EPSILON {
        return right.x;
    }

    // dr·(x - lx)² - dl·(x - rx)² + dl·dr·(ly - ry) = 0
    let a = dr - dl;
    let b = -2.0 * (dr * left.x - dl * right.x);
    let c = dr * left.x * left.x - dl * right.x * right.x + dl * dr * (left.y - right.y);

    if a.abs() <= EPSILON * (dl.abs() + dr.abs()) {
        if b.abs() <= EPSILON {
            return 0.5 * (left.x + right.x);
        }
        return -c / b;
    }

    // cancellation-free form of the quadratic formula
    let disc = (b * b - 4.0 * a * c).max(0.0);
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let x1 = q / a;
    let x2 = if q == 0.0 { x1 } else { c / q };

    if left.y > right.y {
        x1.min(x2)
    } else {
        x1.max(x2)
    }
}

/// Intersect two directed rays
///
/// Returns `None` for parallel rays and when the crossing lies behind either
/// ray's origin. The parametric position is checked on each axis the ray
/// actually moves along.
pub fn ray_intersection(
    origin_a: DVec2,
    direction_a: DVec2,
    origin_b: DVec2,
    direction_b: DVec2,
) -> Option<DVec2> {
    let denom = direction_a.perp_dot(direction_b);
    let scale = direction_a.length() * direction_b.length();
    if denom.abs() <= EPSILON * scale {
        return None;
    }
    let delta = origin_b - origin_a;
    let t = delta.perp_dot(direction_b) / denom;
    let point = origin_a + direction_a * t;

    if !point.is_finite() {
        return None;
    }
    if is_behind(point, origin_a, direction_a) || is_behind(point, origin_b, direction_b) {
        return None;
    }
    Some(point)
}

fn is_behind(point: DVec2, origin: DVec2, direction: DVec2) -> bool {
    let tolerance = EPSILON * (1.0 + origin.abs().max_element());
    for axis in 0..2 {
        let d = direction[axis];
        if d.abs() > EPSILON {
            let t = (point[axis] - origin[axis]) / d;
            if t * d.abs() < -tolerance {
                return true;
            }
        }
    }
    false
}

/// Axis-aligned bounding frame for a diagram
///
/// Finished edges are clipped to this frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower-left corner
    pub min: DVec2,
    /// Upper-right corner
    pub max: DVec2,
}

impl Bounds {
    /// Create a frame from two corners (in any order)
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Frame `[0, width] × [0, height]`
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::ZERO, DVec2::new(width, height))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Length of the frame diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }

    /// Whether `point` lies inside the frame or on its border
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x - EPSILON
            && point.x <= self.max.x + EPSILON
            && point.y >= self.min.y - EPSILON
            && point.y <= self.max.y + EPSILON
    }

    /// Whether `point` lies on the frame border
    pub fn on_border(&self, point: DVec2, tolerance: f64) -> bool {
        let inside = point.x >= self.min.x - tolerance
            && point.x <= self.max.x + tolerance
            && point.y >= self.min.y - tolerance
            && point.y <= self.max.y + tolerance;
        inside
            && ((point.x - self.min.x).abs() <= tolerance
                || (point.x - self.max.x).abs() <= tolerance
                || (point.y - self.min.y).abs() <= tolerance
                || (point.y - self.max.y).abs() <= tolerance)
    }

    /// A point on the ray beyond every part of the frame
    ///
    /// Open edges are extended this far and cut back by `clip_segment`.
    pub fn far_point(&self, origin: DVec2, direction: DVec2) -> DVec2 {
        let dir = direction.normalize_or_zero();
        let center = 0.5 * (self.min + self.max);
        let reach = (origin - center).length() + self.diagonal().max(1.0);
        origin + dir * reach
    }

    /// Parameters `(t0, t1)` of the part of segment `a -> b` inside the frame
    ///
    /// Liang-Barsky clipping. Points within a small tolerance outside the
    /// border count as inside, so endpoints already on the border stay put.
    /// Returns `None` when the segment misses the frame.
    pub fn clip_segment(&self, a: DVec2, b: DVec2) -> Option<(f64, f64)> {
        let tolerance = EPSILON * (1.0 + self.diagonal() + a.abs().max_element());
        let d = b - a;
        let checks = [
            (-d.x, a.x - self.min.x),
            (d.x, self.max.x - a.x),
            (-d.y, a.y - self.min.y),
            (d.y, self.max.y - a.y),
        ];

        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in checks {
            if p == 0.0 {
                if q + tolerance < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                // entering; a start on the border is already inside
                if q + tolerance < 0.0 {
                    t0 = t0.max(q / p);
                }
            } else if q + tolerance < p {
                t1 = t1.min(q / p);
            }
        }

        if t0 > t1 {
            return None;
        }
        Some((t0, t1))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_size(1000.0, 1000.0)
    }
}
