// Engine options
//
// This module contains:
// - Default colors, widths and animation timings
// - `ArcMapOptions`, the full option set resolved at construction
// - `OptionsPatch`, a partial update merged into the live options

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::routes::Connection;
use crate::tooltip::{FollowMode, TooltipContent};

// ============================================================================
// Constants
// ============================================================================

/// Default color of endpoint markers
pub const DEFAULT_POINT_COLOR: &str = "#ff5a36";

/// Default color of route paths
pub const DEFAULT_ARC_COLOR: &str = "#ff5a36";

/// Default color of travelling markers and of the hover highlight
pub const DEFAULT_TRAIL_COLOR: &str = "#ffffff";

/// Default route stroke width in surface units
pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;

/// Default arc curvature (fraction of endpoint distance)
pub const DEFAULT_CURVATURE: f64 = 0.25;

/// Default width of the invisible hit region laid over each route
pub const DEFAULT_HIT_WIDTH: f64 = 12.0;

/// Added to the stroke width when a route is highlighted without its own
/// hover width
pub const HOVER_WIDTH_BONUS: f64 = 2.0;

/// Radius of endpoint markers
pub const POINT_RADIUS: f64 = 4.0;

/// Radius of travelling markers
pub const MARKER_RADIUS: f64 = 3.0;

/// Duration of the draw-on reveal
pub const REVEAL_DURATION: Duration = Duration::from_millis(1000);

/// Base duration of one travelling-marker pass
pub const MARKER_BASE_DURATION: Duration = Duration::from_millis(2400);

/// Extra marker duration per connection index, so markers desynchronise
pub const MARKER_STAGGER: Duration = Duration::from_millis(180);

/// Stagger wraps after this many connections
pub const MARKER_STAGGER_STEPS: usize = 8;

/// Minimum distance between the tooltip box and any surface edge
pub const TOOLTIP_PADDING: f64 = 8.0;

/// Default tooltip offset from its anchor (right, up)
pub const DEFAULT_TOOLTIP_OFFSET: (f64, f64) = (12.0, 12.0);

/// Duration of the travelling-marker pass for connection `idx`
pub fn marker_duration(idx: usize) -> Duration {
    MARKER_BASE_DURATION + MARKER_STAGGER * (idx % MARKER_STAGGER_STEPS) as u32
}

// ============================================================================
// Option structs
// ============================================================================

/// Caller-supplied tooltip content renderer
pub type ContentRenderer = Rc<dyn Fn(&Connection) -> TooltipContent>;

/// Colors used when a connection does not carry its own
#[derive(Debug, Clone, PartialEq)]
pub struct ArcColors {
    /// Endpoint markers
    pub point: String,
    /// Route paths
    pub arc: String,
    /// Travelling markers and hover highlight
    pub trail: String,
}

impl Default for ArcColors {
    fn default() -> Self {
        Self {
            point: DEFAULT_POINT_COLOR.to_string(),
            arc: DEFAULT_ARC_COLOR.to_string(),
            trail: DEFAULT_TRAIL_COLOR.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct TooltipOptions {
    pub follow: FollowMode,
    /// Offset from the anchor, (right, up)
    pub offset: (f64, f64),
    /// Clicking a route pins its tooltip
    pub sticky_on_click: bool,
    /// Extra style class handed to the surface
    pub class_name: Option<String>,
    /// Replaces the default content when set
    pub render: Option<ContentRenderer>,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            follow: FollowMode::Cursor,
            offset: DEFAULT_TOOLTIP_OFFSET,
            sticky_on_click: true,
            class_name: None,
            render: None,
        }
    }
}

impl fmt::Debug for TooltipOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipOptions")
            .field("follow", &self.follow)
            .field("offset", &self.offset)
            .field("sticky_on_click", &self.sticky_on_click)
            .field("class_name", &self.class_name)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Everything the engine is configured with
#[derive(Debug, Clone)]
pub struct ArcMapOptions {
    /// Fixed surface width; the container's width when `None`
    pub width: Option<f64>,
    /// Fixed surface height; the container's height when `None`
    pub height: Option<f64>,
    /// Initial connection list, consumed at construction
    pub connections: Vec<Connection>,
    pub colors: ArcColors,
    pub stroke_width: f64,
    pub curvature: f64,
    /// Play the draw-on reveal after every rebuild
    pub draw_animation: bool,
    /// Run travelling markers unless a connection opts out
    pub show_markers: bool,
    pub hit_width: f64,
    pub tooltip: TooltipOptions,
}

impl Default for ArcMapOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            connections: Vec::new(),
            colors: ArcColors::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            curvature: DEFAULT_CURVATURE,
            draw_animation: true,
            show_markers: true,
            hit_width: DEFAULT_HIT_WIDTH,
            tooltip: TooltipOptions::default(),
        }
    }
}

impl ArcMapOptions {
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    /// Merge a partial update
    ///
    /// Returns the replacement connection list when the patch carries one;
    /// connections are never stored back into the options.
    pub fn merge(&mut self, patch: OptionsPatch) -> Option<Vec<Connection>> {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(colors) = patch.colors {
            if let Some(point) = colors.point {
                self.colors.point = point;
            }
            if let Some(arc) = colors.arc {
                self.colors.arc = arc;
            }
            if let Some(trail) = colors.trail {
                self.colors.trail = trail;
            }
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(curvature) = patch.curvature {
            self.curvature = curvature;
        }
        if let Some(draw) = patch.draw_animation {
            self.draw_animation = draw;
        }
        if let Some(show) = patch.show_markers {
            self.show_markers = show;
        }
        if let Some(width) = patch.hit_width {
            self.hit_width = width;
        }
        if let Some(tooltip) = patch.tooltip {
            if let Some(follow) = tooltip.follow {
                self.tooltip.follow = follow;
            }
            if let Some(offset) = tooltip.offset {
                self.tooltip.offset = offset;
            }
            if let Some(sticky) = tooltip.sticky_on_click {
                self.tooltip.sticky_on_click = sticky;
            }
            if let Some(class_name) = tooltip.class_name {
                self.tooltip.class_name = class_name;
            }
            if let Some(render) = tooltip.render {
                self.tooltip.render = render;
            }
        }
        patch.connections
    }
}

// ============================================================================
// Partial updates
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ColorsPatch {
    pub point: Option<String>,
    pub arc: Option<String>,
    pub trail: Option<String>,
}

/// Tooltip fields to change; `Some(None)` clears an optional field
#[derive(Clone, Default)]
pub struct TooltipPatch {
    pub follow: Option<FollowMode>,
    pub offset: Option<(f64, f64)>,
    pub sticky_on_click: Option<bool>,
    pub class_name: Option<Option<String>>,
    pub render: Option<Option<ContentRenderer>>,
}

impl fmt::Debug for TooltipPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipPatch")
            .field("follow", &self.follow)
            .field("offset", &self.offset)
            .field("sticky_on_click", &self.sticky_on_click)
            .field("class_name", &self.class_name)
            .field("render", &self.render.as_ref().map(|r| r.is_some()))
            .finish()
    }
}

/// Partial option update; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct OptionsPatch {
    pub width: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
    pub connections: Option<Vec<Connection>>,
    pub colors: Option<ColorsPatch>,
    pub stroke_width: Option<f64>,
    pub curvature: Option<f64>,
    pub draw_animation: Option<bool>,
    pub show_markers: Option<bool>,
    pub hit_width: Option<f64>,
    pub tooltip: Option<TooltipPatch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn test_defaults() {
        let opts = ArcMapOptions::default();
        assert_eq!(opts.stroke_width, 4.0);
        assert_eq!(opts.curvature, 0.25);
        assert!(opts.draw_animation);
        assert!(opts.show_markers);
        assert!(opts.tooltip.sticky_on_click);
        assert_eq!(opts.tooltip.follow, FollowMode::Cursor);
        assert_eq!(opts.colors.trail, "#ffffff");
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut opts = ArcMapOptions::default();
        let conns = opts.merge(OptionsPatch {
            curvature: Some(0.5),
            colors: Some(ColorsPatch {
                arc: Some("#00ff00".into()),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert!(conns.is_none());
        assert_eq!(opts.curvature, 0.5);
        assert_eq!(opts.colors.arc, "#00ff00");
        assert_eq!(opts.colors.point, DEFAULT_POINT_COLOR);
        assert_eq!(opts.stroke_width, DEFAULT_STROKE_WIDTH);
    }

    #[test]
    fn test_merge_clears_optional_fields() {
        let mut opts = ArcMapOptions::default();
        opts.width = Some(300.0);
        opts.tooltip.class_name = Some("dark".into());

        opts.merge(OptionsPatch {
            width: Some(None),
            tooltip: Some(TooltipPatch {
                class_name: Some(None),
                follow: Some(FollowMode::Midpoint),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(opts.width, None);
        assert_eq!(opts.tooltip.class_name, None);
        assert_eq!(opts.tooltip.follow, FollowMode::Midpoint);
    }

    #[test]
    fn test_merge_hands_back_connections() {
        let mut opts = ArcMapOptions::default();
        let conns = opts.merge(OptionsPatch {
            connections: Some(vec![Connection::new(
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(1.0, 1.0),
            )]),
            ..Default::default()
        });
        assert_eq!(conns.map(|c| c.len()), Some(1));
        assert!(opts.connections.is_empty());
    }

    #[test]
    fn test_marker_duration_staggers_and_wraps() {
        assert_eq!(marker_duration(0), MARKER_BASE_DURATION);
        assert_eq!(
            marker_duration(2),
            MARKER_BASE_DURATION + Duration::from_millis(360)
        );
        assert_eq!(marker_duration(MARKER_STAGGER_STEPS), marker_duration(0));
    }
}
