// Geographic input types and the Web Mercator projector
//
// Everything in here is pure: the same coordinates and surface size always
// project to the same surface point, bit for bit.

pub mod arc;

pub use arc::{build_arc, CurveDescriptor};

use std::f64::consts::{FRAC_PI_4, PI};

/// A geographic coordinate supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees (positive north)
    pub latitude: f64,
    /// Longitude in degrees (positive east)
    pub longitude: f64,
    /// Optional place name shown in tooltips
    pub label: Option<String>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    pub fn labeled(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: Some(label.into()),
        }
    }
}

/// A point in drawing-surface space (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

impl SurfacePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: SurfacePoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Project a latitude/longitude pair onto a `width` x `height` surface
///
/// Spherical (Web) Mercator forward transform:
/// - x is linear in longitude, -180 at the left edge, +180 at the right
/// - y uses the inverse Gudermannian of latitude, equator at mid-height
///
/// Latitude is not clamped. Values approaching +-90 degrees run into the
/// asymptote of `tan` and produce huge or non-finite y; callers get exactly
/// what the formula gives them.
pub fn project_lat_lon(latitude: f64, longitude: f64, width: f64, height: f64) -> SurfacePoint {
    let phi = latitude.to_radians();
    let x = (longitude + 180.0) / 360.0 * width;
    let y = (1.0 - (FRAC_PI_4 + phi / 2.0).tan().ln() / PI) / 2.0 * height;
    SurfacePoint { x, y }
}

/// Project a `GeoPoint` onto a surface of the given size
pub fn project(point: &GeoPoint, size: SurfaceSize) -> SurfacePoint {
    project_lat_lon(point.latitude, point.longitude, size.width, size.height)
}
