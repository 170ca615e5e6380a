// Rendering surface abstraction
//
// The engine never draws. It drives a `SurfaceAdapter`, the one seam that
// knows about a concrete rendering technology: it creates and restyles vector
// paths and circular markers, measures and shows the tooltip overlay,
// observes container resizes, watches for pointer activity outside the
// surface, and schedules the next display frame.

pub mod terminal;

#[cfg(test)]
pub(crate) mod recording;

use crate::geo::{CurveDescriptor, SurfacePoint, SurfaceSize};
use crate::tooltip::{TooltipContent, TooltipPlacement};

/// Handle to a primitive created on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

/// Handle to an outside-pointer listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle to a resize observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Stroke of a visible route path
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    /// Color as a CSS-style string (`#rrggbb` or a name)
    pub stroke: String,
    pub width: f64,
    /// Whether the hover style is applied
    pub highlighted: bool,
}

/// Invisible, widened, focusable target laid over a route
#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    /// Connection index carried by every event from this region
    pub index: usize,
    /// Accessible label (title or fallback identity)
    pub label: String,
    pub width: f64,
}

/// What a circular marker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// A de-duplicated route endpoint
    Point,
    /// The dot travelling along a route
    Travelling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub kind: MarkerKind,
    pub fill: String,
    pub radius: f64,
}

/// Host rendering surface driven by the engine
pub trait SurfaceAdapter {
    /// Resolve `container` and report its current size, or `None` if it
    /// does not exist
    fn resolve_container(&mut self, container: &str) -> Option<SurfaceSize>;

    fn create_path(&mut self, curve: &CurveDescriptor, style: &PathStyle) -> PrimitiveId;

    fn restyle_path(&mut self, id: PrimitiveId, style: &PathStyle);

    /// Show only the first `progress` (0..=1) of a path's length
    fn set_reveal(&mut self, id: PrimitiveId, progress: f64);

    fn create_hit_region(&mut self, curve: &CurveDescriptor, region: &HitRegion) -> PrimitiveId;

    fn create_marker(&mut self, center: SurfacePoint, style: &MarkerStyle) -> PrimitiveId;

    fn move_marker(&mut self, id: PrimitiveId, center: SurfacePoint);

    fn remove(&mut self, id: PrimitiveId);

    /// Rendered size of the tooltip for `content`
    fn measure_tooltip(&mut self, content: &TooltipContent, class: Option<&str>) -> SurfaceSize;

    fn show_tooltip(
        &mut self,
        content: &TooltipContent,
        placement: &TooltipPlacement,
        pinned: bool,
        class: Option<&str>,
    );

    fn hide_tooltip(&mut self);

    fn observe_resize(&mut self) -> ObserverId;

    fn disconnect_resize(&mut self, id: ObserverId);

    /// Start reporting pointer activity outside the surface
    fn watch_outside_pointer(&mut self) -> ListenerId;

    fn unwatch_outside_pointer(&mut self, id: ListenerId);

    /// Ask for one more display frame
    fn request_frame(&mut self);
}
