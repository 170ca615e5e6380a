// Arc construction and arc-length sampling
//
// A connection is drawn as a cubic Bezier whose control points are lifted off
// the chord along its normal. The descriptor keeps a small arc-length table so
// that "point at fraction of length" is cheap enough to call every frame.

use super::SurfacePoint;

/// Number of uniform-t samples in the arc-length table
const ARC_SAMPLES: usize = 64;

/// Below this total length the curve is treated as a single point
const EPS_LEN: f64 = 1e-9;

/// A cubic curve between two projected endpoints
///
/// `start`/`end` are the projected endpoints, `control1`/`control2` the lifted
/// quarter and three-quarter chord points. The curve is immutable once built;
/// a resize or route replacement builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDescriptor {
    pub start: SurfacePoint,
    pub end: SurfacePoint,
    pub control1: SurfacePoint,
    pub control2: SurfacePoint,
    /// Signed offset applied along the chord normal
    lift: f64,
    /// Curve points at t = i / ARC_SAMPLES
    samples: Vec<SurfacePoint>,
    /// Cumulative polyline length at each sample
    lengths: Vec<f64>,
}

/// Build the arc between `a` and `b`
///
/// Control points sit at 1/4 and 3/4 of the chord, pushed along the chord
/// normal by `distance(a, b) * curvature`. The sign of the push depends on
/// which endpoint is further left, so a route bows toward the top of the
/// surface whichever way it runs. Coincident endpoints use a unit distance
/// for the normal, which leaves a zero-length, directionless curve.
pub fn build_arc(a: SurfacePoint, b: SurfacePoint, curvature: f64) -> CurveDescriptor {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 {
        dist = 1.0;
    }

    // Unit normal of the chord (rotated +90 deg in y-down space)
    let nx = -dy / dist;
    let ny = dx / dist;

    // Left-to-right: normal points down the screen, so lift against it
    let direction = if a.x < b.x { -1.0 } else { 1.0 };
    let lift = dist * curvature * direction;

    let control1 = SurfacePoint::new(a.x + dx * 0.25 + nx * lift, a.y + dy * 0.25 + ny * lift);
    let control2 = SurfacePoint::new(a.x + dx * 0.75 + nx * lift, a.y + dy * 0.75 + ny * lift);

    CurveDescriptor::new(a, control1, control2, b, lift)
}

impl CurveDescriptor {
    fn new(
        start: SurfacePoint,
        control1: SurfacePoint,
        control2: SurfacePoint,
        end: SurfacePoint,
        lift: f64,
    ) -> Self {
        let mut curve = Self {
            start,
            end,
            control1,
            control2,
            lift,
            samples: Vec::with_capacity(ARC_SAMPLES + 1),
            lengths: Vec::with_capacity(ARC_SAMPLES + 1),
        };

        let mut total = 0.0;
        let mut prev = start;
        for i in 0..=ARC_SAMPLES {
            let p = curve.eval(i as f64 / ARC_SAMPLES as f64);
            total += prev.distance_to(p);
            curve.samples.push(p);
            curve.lengths.push(total);
            prev = p;
        }

        curve
    }

    /// Evaluate the curve at parameter t in [0, 1]
    pub fn eval(&self, t: f64) -> SurfacePoint {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        SurfacePoint {
            x: a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            y: a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        }
    }

    /// Signed lift along the chord normal used to place the control points
    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// Approximate arc length of the curve
    pub fn length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Whether every defining point is finite
    pub fn is_finite(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.control1.is_finite()
            && self.control2.is_finite()
    }

    /// Point at `fraction` (clamped to [0, 1]) of the curve's arc length
    ///
    /// Used by both the moving marker and the midpoint tooltip anchor.
    pub fn point_at_fraction(&self, fraction: f64) -> SurfacePoint {
        let fraction = fraction.clamp(0.0, 1.0);
        let total = self.length();
        if total <= EPS_LEN {
            return self.start;
        }

        let target = fraction * total;
        let idx = self
            .lengths
            .partition_point(|&len| len < target)
            .saturating_sub(1)
            .min(ARC_SAMPLES - 1);

        let seg_start = self.lengths[idx];
        let seg_len = self.lengths[idx + 1] - seg_start;
        let local = if seg_len > EPS_LEN {
            ((target - seg_start) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.eval((idx as f64 + local) / ARC_SAMPLES as f64)
    }

    /// Midpoint by arc length
    pub fn midpoint(&self) -> SurfacePoint {
        self.point_at_fraction(0.5)
    }

    /// `count + 1` points spaced evenly by arc length, start to end
    pub fn polyline(&self, count: usize) -> Vec<SurfacePoint> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.point_at_fraction(i as f64 / count as f64))
            .collect()
    }

    /// Shortest distance from `p` to the sampled curve
    pub fn distance_to(&self, p: SurfacePoint) -> f64 {
        self.samples
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Distance from `p` to the segment `a`-`b`
fn segment_distance(p: SurfacePoint, a: SurfacePoint, b: SurfacePoint) -> f64 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let vv = vx * vx + vy * vy;
    let t = if vv > 0.0 {
        (((p.x - a.x) * vx + (p.y - a.y) * vy) / vv).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance_to(SurfacePoint::new(a.x + t * vx, a.y + t * vy))
}
