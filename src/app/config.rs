// Application configuration types
//
// This module contains configuration for the terminal front end:
// - Frame and pulse timings
// - Curvature adjustment limits
// - Map settings toggled from the keyboard
// - The built-in sample route set

use std::time::Duration;

use arcmap::engine::config::{DEFAULT_CURVATURE, DEFAULT_STROKE_WIDTH};
use arcmap::{Connection, FollowMode, GeoPoint};

// ============================================================================
// Constants
// ============================================================================

/// Event poll timeout, i.e. the longest a frame waits for input
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Tick interval for the pinned-tooltip pulse (100ms)
pub const TICK_INTERVAL_MS: u128 = 100;

/// Pulse phase advance per tick
pub const PULSE_STEP: f32 = 0.05;

/// Curvature adjustment step
pub const CURVATURE_STEP: f64 = 0.05;

/// Lowest curvature reachable from the keyboard
pub const MIN_CURVATURE: f64 = -0.5;

/// Highest curvature reachable from the keyboard
pub const MAX_CURVATURE: f64 = 0.75;

/// Duration to highlight a recently changed curvature
pub const CHANGE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

/// Graticule spacing in degrees
pub const GRATICULE_STEP_DEG: f64 = 30.0;

/// Latitude where meridians stop (Mercator y diverges toward the poles)
pub const GRATICULE_LAT_LIMIT: f64 = 80.0;

/// Line segments used to rasterise one route
pub const PATH_SEGMENTS: usize = 48;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Map settings the user can change at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Draw-on reveal after each rebuild (toggle with 'a' key)
    pub draw_animation: bool,

    /// Travelling markers (toggle with 'm' key)
    pub show_markers: bool,

    /// Tooltip anchor while hovering (toggle with 'f' key)
    pub follow: FollowMode,

    /// Curvature for every route (adjust with '+' and '-')
    pub curvature: f64,

    pub stroke_width: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            draw_animation: true,
            show_markers: true,
            follow: FollowMode::Cursor,
            curvature: DEFAULT_CURVATURE,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

// ============================================================================
// Sample data
// ============================================================================

/// Routes shown by the front end
///
/// New York and London appear in several routes, so the map shows fewer
/// endpoint markers than route ends.
pub fn sample_routes() -> Vec<Connection> {
    let nyc = GeoPoint::labeled(40.7128, -74.006, "New York");
    let london = GeoPoint::labeled(51.5074, -0.1278, "London");
    let tokyo = GeoPoint::labeled(35.6762, 139.6503, "Tokyo");
    let sydney = GeoPoint::labeled(-33.8688, 151.2093, "Sydney");
    let rio = GeoPoint::labeled(-22.9068, -43.1729, "Rio de Janeiro");
    let cape_town = GeoPoint::labeled(-33.9249, 18.4241, "Cape Town");
    let singapore = GeoPoint::labeled(1.3521, 103.8198, "Singapore");

    vec![
        Connection::new(nyc.clone(), london.clone())
            .id("nyc-lon")
            .title("Transatlantic")
            .subtitle("New York to London"),
        Connection::new(london.clone(), tokyo.clone())
            .id("lon-tyo")
            .title("Polar route"),
        Connection::new(nyc.clone(), rio.clone())
            .id("nyc-rio")
            .color("#9ece6a"),
        Connection::new(london.clone(), cape_town)
            .id("lon-cpt")
            .title("North to south"),
        Connection::new(singapore.clone(), sydney)
            .id("sin-syd")
            .curvature(0.4),
        Connection::new(tokyo, singapore)
            .id("tyo-sin")
            .hover("#ff9e64", 6.0),
        Connection::new(rio, london).id("rio-lon").show_marker(false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_engine() {
        let settings = MapSettings::default();
        assert!(settings.draw_animation);
        assert!(settings.show_markers);
        assert_eq!(settings.curvature, DEFAULT_CURVATURE);
        assert!(settings.curvature >= MIN_CURVATURE && settings.curvature <= MAX_CURVATURE);
    }

    #[test]
    fn test_sample_routes_have_unique_ids() {
        let routes = sample_routes();
        let mut ids: Vec<&str> = routes.iter().filter_map(|r| r.id.as_deref()).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, routes.len());
    }
}
