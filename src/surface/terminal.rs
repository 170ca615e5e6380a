// Terminal rendering surface
//
// Retained scene for a ratatui front end. Surface units are braille dots:
// every terminal cell is 2 dots wide and 4 dots tall, so a map area of
// `cols` x `rows` cells is a `2 * cols` x `4 * rows` surface. The UI layer
// reads the scene back each frame and paints it on a braille canvas.

use std::collections::BTreeMap;

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::{
    HitRegion, ListenerId, MarkerKind, MarkerStyle, ObserverId, PathStyle, PrimitiveId,
    SurfaceAdapter,
};
use crate::geo::{CurveDescriptor, SurfacePoint, SurfaceSize};
use crate::tooltip::{TooltipContent, TooltipPlacement};

/// The one container name this surface resolves
pub const CONTAINER: &str = "map";

/// Braille dots per cell, horizontally
pub const DOTS_PER_COL: f64 = 2.0;

/// Braille dots per cell, vertically
pub const DOTS_PER_ROW: f64 = 4.0;

/// Cells added around tooltip text (border + one column of padding per side)
const TOOLTIP_FRAME_COLS: usize = 4;
const TOOLTIP_FRAME_ROWS: usize = 2;

// ============================================================================
// Scene items
// ============================================================================

#[derive(Debug, Clone)]
pub struct PathItem {
    pub curve: CurveDescriptor,
    pub style: PathStyle,
    /// Revealed fraction of the path length
    pub reveal: f64,
}

impl PathItem {
    /// Points along the revealed part of the curve
    ///
    /// Non-finite samples are dropped, so a degenerate projection draws
    /// nothing instead of garbage.
    pub fn visible_points(&self, segments: usize) -> Vec<SurfacePoint> {
        let reveal = self.reveal.clamp(0.0, 1.0);
        if reveal <= 0.0 {
            return Vec::new();
        }
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                self.curve
                    .point_at_fraction(reveal * i as f64 / segments as f64)
            })
            .filter(SurfacePoint::is_finite)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MarkerItem {
    pub center: SurfacePoint,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone)]
pub enum SceneItem {
    Path(PathItem),
    Hit(HitRegion),
    Marker(MarkerItem),
}

/// Tooltip as the terminal shows it
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipOverlay {
    pub lines: Vec<String>,
    pub placement: TooltipPlacement,
    pub pinned: bool,
    pub class: Option<String>,
}

// ============================================================================
// Surface
// ============================================================================

/// `SurfaceAdapter` backed by a terminal region
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    /// Cells covered by the map
    area: Rect,
    /// Scene in creation order; later ids draw on top
    scene: BTreeMap<PrimitiveId, SceneItem>,
    tooltip: Option<TooltipOverlay>,
    observer: Option<ObserverId>,
    pending_resize: Option<SurfaceSize>,
    outside_listener: Option<ListenerId>,
    frame_requested: bool,
    next_id: u64,
}

impl TerminalSurface {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            ..Self::default()
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Surface size in braille dots
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(
            self.area.width as f64 * DOTS_PER_COL,
            self.area.height as f64 * DOTS_PER_ROW,
        )
    }

    /// Move or resize the map region
    ///
    /// A size change is queued for the resize observer, if one is armed.
    pub fn set_area(&mut self, area: Rect) {
        let resized = area.width != self.area.width || area.height != self.area.height;
        self.area = area;
        if resized && self.observer.is_some() {
            self.pending_resize = Some(self.size());
        }
    }

    /// Take the queued size change, if any
    pub fn take_resize(&mut self) -> Option<SurfaceSize> {
        self.pending_resize.take()
    }

    /// Take the frame request flag
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    pub fn has_outside_listener(&self) -> bool {
        self.outside_listener.is_some()
    }

    /// Surface point at the centre of cell (`column`, `row`), if the cell is
    /// inside the map
    pub fn point_at(&self, column: u16, row: u16) -> Option<SurfacePoint> {
        let inside = column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height;
        if !inside {
            return None;
        }
        Some(SurfacePoint::new(
            (column - self.area.x) as f64 * DOTS_PER_COL + DOTS_PER_COL / 2.0,
            (row - self.area.y) as f64 * DOTS_PER_ROW + DOTS_PER_ROW / 2.0,
        ))
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathItem> {
        self.scene.values().filter_map(|item| match item {
            SceneItem::Path(path) => Some(path),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerItem> {
        self.scene.values().filter_map(|item| match item {
            SceneItem::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn hit_regions(&self) -> impl Iterator<Item = &HitRegion> {
        self.scene.values().filter_map(|item| match item {
            SceneItem::Hit(region) => Some(region),
            _ => None,
        })
    }

    pub fn point_marker_count(&self) -> usize {
        self.markers()
            .filter(|m| m.style.kind == MarkerKind::Point)
            .count()
    }

    pub fn tooltip(&self) -> Option<&TooltipOverlay> {
        self.tooltip.as_ref()
    }

    /// Cell rectangle of the tooltip, clipped to the map area
    pub fn tooltip_rect(&self) -> Option<Rect> {
        let tip = self.tooltip.as_ref()?;
        let p = &tip.placement;
        let col = (p.left / DOTS_PER_COL).round().max(0.0) as u16;
        let row = (p.top / DOTS_PER_ROW).round().max(0.0) as u16;
        let width = (p.width / DOTS_PER_COL).round() as u16;
        let height = (p.height / DOTS_PER_ROW).round() as u16;

        let rect = Rect::new(self.area.x + col, self.area.y + row, width, height);
        let clipped = rect.intersection(self.area);
        (!clipped.is_empty()).then_some(clipped)
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl SurfaceAdapter for TerminalSurface {
    fn resolve_container(&mut self, container: &str) -> Option<SurfaceSize> {
        (container == CONTAINER).then(|| self.size())
    }

    fn create_path(&mut self, curve: &CurveDescriptor, style: &PathStyle) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.scene.insert(
            id,
            SceneItem::Path(PathItem {
                curve: curve.clone(),
                style: style.clone(),
                reveal: 1.0,
            }),
        );
        id
    }

    fn restyle_path(&mut self, id: PrimitiveId, style: &PathStyle) {
        if let Some(SceneItem::Path(path)) = self.scene.get_mut(&id) {
            path.style = style.clone();
        }
    }

    fn set_reveal(&mut self, id: PrimitiveId, progress: f64) {
        if let Some(SceneItem::Path(path)) = self.scene.get_mut(&id) {
            path.reveal = progress;
        }
    }

    fn create_hit_region(&mut self, _curve: &CurveDescriptor, region: &HitRegion) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.scene.insert(id, SceneItem::Hit(region.clone()));
        id
    }

    fn create_marker(&mut self, center: SurfacePoint, style: &MarkerStyle) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.scene.insert(
            id,
            SceneItem::Marker(MarkerItem {
                center,
                style: style.clone(),
            }),
        );
        id
    }

    fn move_marker(&mut self, id: PrimitiveId, center: SurfacePoint) {
        if let Some(SceneItem::Marker(marker)) = self.scene.get_mut(&id) {
            marker.center = center;
        }
    }

    fn remove(&mut self, id: PrimitiveId) {
        self.scene.remove(&id);
    }

    fn measure_tooltip(&mut self, content: &TooltipContent, _class: Option<&str>) -> SurfaceSize {
        let lines = content.text_lines();
        let cols = lines
            .iter()
            .map(|l| UnicodeWidthStr::width(l.as_str()))
            .max()
            .unwrap_or(0)
            + TOOLTIP_FRAME_COLS;
        let rows = lines.len() + TOOLTIP_FRAME_ROWS;
        SurfaceSize::new(cols as f64 * DOTS_PER_COL, rows as f64 * DOTS_PER_ROW)
    }

    fn show_tooltip(
        &mut self,
        content: &TooltipContent,
        placement: &TooltipPlacement,
        pinned: bool,
        class: Option<&str>,
    ) {
        self.tooltip = Some(TooltipOverlay {
            lines: content.text_lines(),
            placement: *placement,
            pinned,
            class: class.map(str::to_string),
        });
    }

    fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    fn observe_resize(&mut self) -> ObserverId {
        let id = ObserverId(self.alloc());
        self.observer = Some(id);
        id
    }

    fn disconnect_resize(&mut self, id: ObserverId) {
        if self.observer == Some(id) {
            self.observer = None;
            self.pending_resize = None;
        }
    }

    fn watch_outside_pointer(&mut self) -> ListenerId {
        let id = ListenerId(self.alloc());
        if let Some(previous) = self.outside_listener.replace(id) {
            tracing::warn!(listener = previous.0, "Replacing live outside-pointer listener");
        }
        id
    }

    fn unwatch_outside_pointer(&mut self, id: ListenerId) {
        if self.outside_listener == Some(id) {
            self.outside_listener = None;
        }
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::build_arc;

    fn surface() -> TerminalSurface {
        TerminalSurface::new(Rect::new(1, 2, 80, 20))
    }

    #[test]
    fn test_size_in_braille_dots() {
        let s = surface();
        assert_eq!(s.size(), SurfaceSize::new(160.0, 80.0));
    }

    #[test]
    fn test_resolves_only_map_container() {
        let mut s = surface();
        assert_eq!(s.resolve_container("map"), Some(SurfaceSize::new(160.0, 80.0)));
        assert_eq!(s.resolve_container("#map"), None);
    }

    #[test]
    fn test_resize_queued_only_when_observed() {
        let mut s = surface();
        s.set_area(Rect::new(1, 2, 40, 10));
        assert_eq!(s.take_resize(), None);

        let id = s.observe_resize();
        s.set_area(Rect::new(0, 0, 40, 10));
        assert_eq!(s.take_resize(), None, "a move is not a resize");

        s.set_area(Rect::new(0, 0, 50, 10));
        assert_eq!(s.take_resize(), Some(SurfaceSize::new(100.0, 40.0)));
        assert_eq!(s.take_resize(), None);

        s.disconnect_resize(id);
        s.set_area(Rect::new(0, 0, 60, 10));
        assert_eq!(s.take_resize(), None);
    }

    #[test]
    fn test_point_at_cell_centre() {
        let s = surface();
        assert_eq!(s.point_at(1, 2), Some(SurfacePoint::new(1.0, 2.0)));
        assert_eq!(s.point_at(11, 7), Some(SurfacePoint::new(21.0, 22.0)));
        assert_eq!(s.point_at(0, 2), None);
        assert_eq!(s.point_at(81, 2), None);
        assert_eq!(s.point_at(5, 22), None);
    }

    #[test]
    fn test_measure_uses_display_width() {
        let mut s = surface();
        let size = s.measure_tooltip(&TooltipContent::Text("東京 → NYC".into()), None);
        // 4 + 1 + 1 + 1 + 3 columns of text
        assert_eq!(size, SurfaceSize::new((10 + 4) as f64 * 2.0, 3.0 * 4.0));
    }

    #[test]
    fn test_scene_lifecycle() {
        let mut s = surface();
        let curve = build_arc(SurfacePoint::new(0.0, 40.0), SurfacePoint::new(100.0, 40.0), 0.25);
        let style = PathStyle {
            stroke: "#ff5a36".into(),
            width: 4.0,
            highlighted: false,
        };
        let path = s.create_path(&curve, &style);
        let marker = s.create_marker(
            SurfacePoint::new(0.0, 40.0),
            &MarkerStyle {
                kind: MarkerKind::Point,
                fill: "#ff5a36".into(),
                radius: 4.0,
            },
        );
        assert_eq!(s.paths().count(), 1);
        assert_eq!(s.point_marker_count(), 1);

        s.set_reveal(path, 0.25);
        assert_eq!(s.paths().next().map(|p| p.reveal), Some(0.25));

        s.remove(path);
        s.remove(marker);
        assert!(s.is_empty());
    }

    #[test]
    fn test_visible_points_follow_reveal() {
        let curve = build_arc(SurfacePoint::new(0.0, 0.0), SurfacePoint::new(100.0, 0.0), 0.0);
        let mut item = PathItem {
            curve,
            style: PathStyle {
                stroke: "red".into(),
                width: 1.0,
                highlighted: false,
            },
            reveal: 0.0,
        };
        assert!(item.visible_points(10).is_empty());

        item.reveal = 0.5;
        let pts = item.visible_points(10);
        assert_eq!(pts.len(), 11);
        let last = pts.last().copied().unwrap_or_default();
        assert!((last.x - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let curve = build_arc(
            SurfacePoint::new(0.0, f64::INFINITY),
            SurfacePoint::new(100.0, 0.0),
            0.25,
        );
        let item = PathItem {
            curve,
            style: PathStyle {
                stroke: "red".into(),
                width: 1.0,
                highlighted: false,
            },
            reveal: 1.0,
        };
        assert!(item.visible_points(16).iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_tooltip_rect_in_cells() {
        let mut s = surface();
        s.show_tooltip(
            &TooltipContent::Text("hi".into()),
            &TooltipPlacement {
                anchor: SurfacePoint::new(20.0, 40.0),
                left: 8.0,
                top: 28.0,
                width: 24.0,
                height: 12.0,
            },
            true,
            None,
        );
        assert_eq!(s.tooltip_rect(), Some(Rect::new(5, 9, 12, 3)));
        assert!(s.tooltip().is_some_and(|t| t.pinned));

        s.hide_tooltip();
        assert_eq!(s.tooltip_rect(), None);
    }

    #[test]
    fn test_outside_listener_and_frame_flags() {
        let mut s = surface();
        let id = s.watch_outside_pointer();
        assert!(s.has_outside_listener());
        s.unwatch_outside_pointer(ListenerId(id.0 + 100));
        assert!(s.has_outside_listener());
        s.unwatch_outside_pointer(id);
        assert!(!s.has_outside_listener());

        s.request_frame();
        assert!(s.take_frame_request());
        assert!(!s.take_frame_request());
    }
}
