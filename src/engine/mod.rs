// Map engine
//
// `ArcMap` owns the route model, the interaction controller, the tooltip
// positioner and the animation scheduler, and drives one `SurfaceAdapter`.
// Every change to connections, options or size is a full rebuild:
//
// 1. stale bindings are torn down (animations, outside listener, primitives)
// 2. geometry is recomputed
// 3. primitives, interaction state and animations are installed again
//
// Nothing is diffed.

pub mod config;

use crate::animation::{AnimationKind, AnimationScheduler, Clock, SystemClock, TaskKey};
use crate::error::{ArcMapError, Result};
use crate::geo::{GeoPoint, SurfacePoint, SurfaceSize};
use crate::interaction::{
    Effect, InteractionController, InteractionEvent, InteractionState, TooltipAnchor,
};
use crate::routes::{Connection, ConnectionKey, RouteModel};
use crate::surface::{
    HitRegion, ListenerId, MarkerKind, MarkerStyle, ObserverId, PathStyle, PrimitiveId,
    SurfaceAdapter,
};
use crate::tooltip::{TooltipContent, TooltipPositioner, TooltipState};

use config::{
    marker_duration, ArcMapOptions, OptionsPatch, HOVER_WIDTH_BONUS, MARKER_RADIUS, POINT_RADIUS,
    REVEAL_DURATION, TOOLTIP_PADDING,
};

/// Surface primitives owned by one connection
#[derive(Debug, Clone, Copy)]
struct RouteSlot {
    path: PrimitiveId,
    hit: PrimitiveId,
    /// Travelling marker, present only while it runs
    marker: Option<PrimitiveId>,
}

/// Interactive arc overlay bound to one surface container
pub struct ArcMap<S: SurfaceAdapter, C: Clock = SystemClock> {
    surface: S,
    clock: C,
    container: String,
    container_size: SurfaceSize,
    options: ArcMapOptions,
    model: RouteModel,
    controller: InteractionController,
    positioner: TooltipPositioner,
    scheduler: AnimationScheduler,
    tooltip: TooltipState,
    slots: Vec<RouteSlot>,
    point_markers: Vec<PrimitiveId>,
    outside_listener: Option<ListenerId>,
    resize_observer: Option<ObserverId>,
    /// Connection under the pointer, as last resolved by hit testing
    hovered: Option<usize>,
    /// Connection holding keyboard focus
    focused: Option<usize>,
    destroyed: bool,
}

impl<S: SurfaceAdapter> ArcMap<S, SystemClock> {
    /// Bind a new map to `container` on `surface`
    pub fn create(surface: S, container: &str, options: ArcMapOptions) -> Result<Self> {
        Self::create_with_clock(surface, SystemClock::new(), container, options)
    }
}

impl<S: SurfaceAdapter, C: Clock> ArcMap<S, C> {
    /// Bind a new map, timing animations with `clock`
    ///
    /// Fails only when the surface cannot resolve `container`.
    pub fn create_with_clock(
        mut surface: S,
        clock: C,
        container: &str,
        mut options: ArcMapOptions,
    ) -> Result<Self> {
        let Some(container_size) = surface.resolve_container(container) else {
            tracing::warn!(container, "Container not found");
            return Err(ArcMapError::ContainerNotFound {
                container: container.to_string(),
            });
        };

        let connections = std::mem::take(&mut options.connections);
        let size = effective_size(&options, container_size);
        let resize_observer = Some(surface.observe_resize());

        let mut map = Self {
            surface,
            clock,
            container: container.to_string(),
            container_size,
            model: RouteModel::new(size, options.curvature),
            controller: InteractionController::new(
                options.tooltip.follow,
                options.tooltip.sticky_on_click,
            ),
            positioner: TooltipPositioner::new(options.tooltip.offset, TOOLTIP_PADDING),
            scheduler: AnimationScheduler::new(),
            tooltip: TooltipState::default(),
            slots: Vec::new(),
            point_markers: Vec::new(),
            outside_listener: None,
            resize_observer,
            hovered: None,
            focused: None,
            destroyed: false,
            options,
        };
        map.redraw(|model| model.set_connections(connections));

        tracing::info!(
            container,
            routes = map.model.len(),
            width = size.width,
            height = size.height,
            "Arc map created"
        );
        Ok(map)
    }

    // ========================================================================
    // Public operations
    // ========================================================================

    /// Replace every connection
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        if self.destroyed {
            return;
        }
        self.redraw(|model| model.set_connections(connections));
    }

    /// Merge a partial option update and rebuild
    pub fn update(&mut self, patch: OptionsPatch) {
        if self.destroyed {
            return;
        }
        let connections = self.options.merge(patch);

        self.positioner = TooltipPositioner::new(self.options.tooltip.offset, TOOLTIP_PADDING);
        self.controller.set_follow_mode(self.options.tooltip.follow);
        self.controller.set_sticky(self.options.tooltip.sticky_on_click);

        let size = effective_size(&self.options, self.container_size);
        let curvature = self.options.curvature;
        self.redraw(|model| model.reconfigure(size, curvature, connections));
    }

    /// Container size changed; rebuild if the effective size did
    pub fn on_resize(&mut self, container_size: SurfaceSize) {
        if self.destroyed || self.resize_observer.is_none() {
            return;
        }
        self.container_size = container_size;
        let size = effective_size(&self.options, container_size);
        if size == self.model.size() {
            return;
        }
        self.redraw(|model| model.resize(size));
    }

    /// Advance animations by one display frame
    ///
    /// Returns true while another frame is needed; the surface has then
    /// already been asked for one.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let now = self.clock.now();

        for sample in self.scheduler.tick(now) {
            let idx = sample.key.connection;
            let Some(slot) = self.slots.get_mut(idx) else {
                continue;
            };
            match sample.key.kind {
                AnimationKind::Reveal => self.surface.set_reveal(slot.path, sample.progress),
                AnimationKind::Marker => {
                    let (Some(marker), Some(entry)) = (slot.marker, self.model.entry(idx)) else {
                        continue;
                    };
                    if sample.finished {
                        self.surface.remove(marker);
                        slot.marker = None;
                    } else {
                        let at = entry.curve.point_at_fraction(sample.progress);
                        self.surface.move_marker(marker, at);
                    }
                }
            }
        }

        let busy = !self.scheduler.is_idle();
        if busy {
            self.surface.request_frame();
        }
        busy
    }

    /// Remove everything from the surface and stop all activity
    ///
    /// Idempotent; every other operation is a no-op afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let effects = self.controller.reset();
        self.apply(effects);
        self.teardown();
        if let Some(id) = self.resize_observer.take() {
            self.surface.disconnect_resize(id);
        }
        self.model.set_connections(Vec::new());
        self.destroyed = true;
        tracing::info!(container = %self.container, "Arc map destroyed");
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feed one interaction event to the controller and apply its effects
    pub fn handle(&mut self, event: InteractionEvent) {
        if self.destroyed {
            return;
        }
        let effects = self.controller.handle(event);
        self.apply(effects);
    }

    /// Topmost connection whose hit region contains `at`
    pub fn hit_test(&self, at: SurfacePoint) -> Option<usize> {
        self.model
            .entries()
            .iter()
            .enumerate()
            .rev()
            .find(|(idx, entry)| entry.curve.distance_to(at) <= self.hit_width(*idx) / 2.0)
            .map(|(idx, _)| idx)
    }

    /// Pointer moved to `at` inside the surface
    pub fn pointer_moved(&mut self, at: SurfacePoint) {
        if self.destroyed {
            return;
        }
        let hit = self.hit_test(at);
        if hit.is_some() && hit == self.hovered {
            if let Some(index) = hit {
                self.handle(InteractionEvent::PointerMove { index, at });
            }
            return;
        }
        if let Some(index) = self.hovered.take() {
            self.handle(InteractionEvent::PointerLeave { index });
        }
        if let Some(index) = hit {
            self.hovered = Some(index);
            self.handle(InteractionEvent::PointerEnter { index, at });
        }
    }

    /// Pointer left the surface
    pub fn pointer_left(&mut self) {
        if let Some(index) = self.hovered.take() {
            self.handle(InteractionEvent::PointerLeave { index });
        }
    }

    /// Press at `at` inside the surface; returns whether it hit a route
    pub fn pointer_pressed(&mut self, at: SurfacePoint) -> bool {
        if self.destroyed {
            return false;
        }
        match self.hit_test(at) {
            Some(index) => {
                self.handle(InteractionEvent::Activate {
                    index,
                    at: Some(at),
                });
                true
            }
            None => false,
        }
    }

    /// The host saw pointer activity outside the surface
    pub fn outside_pointer(&mut self) {
        if self.outside_listener.is_some() {
            self.handle(InteractionEvent::OutsidePointer);
        }
    }

    /// Move keyboard focus to the next route, wrapping at the end
    pub fn focus_next(&mut self) {
        let count = self.model.len();
        if self.destroyed || count == 0 {
            return;
        }
        let next = match self.focused {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        };
        self.move_focus(next);
    }

    /// Move keyboard focus to the previous route, wrapping at the start
    pub fn focus_prev(&mut self) {
        let count = self.model.len();
        if self.destroyed || count == 0 {
            return;
        }
        let prev = match self.focused {
            Some(i) if i > 0 && i < count => i - 1,
            _ => count - 1,
        };
        self.move_focus(prev);
    }

    pub fn blur(&mut self) {
        if let Some(index) = self.focused.take() {
            self.handle(InteractionEvent::FocusOut { index });
        }
    }

    /// Enter on the focused route
    pub fn activate_focused(&mut self) {
        if let Some(index) = self.focused {
            self.handle(InteractionEvent::Activate { index, at: None });
        }
    }

    /// Escape, delivered to the pinned route if any, else the focused one
    pub fn escape(&mut self) {
        let target = self.controller.lock().owner().or(self.focused);
        if let Some(index) = target {
            self.handle(InteractionEvent::Escape { index });
        }
    }

    fn move_focus(&mut self, next: usize) {
        if let Some(prev) = self.focused.replace(next) {
            if prev != next {
                self.handle(InteractionEvent::FocusOut { index: prev });
            }
        }
        self.handle(InteractionEvent::FocusIn { index: next });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn model(&self) -> &RouteModel {
        &self.model
    }

    pub fn options(&self) -> &ArcMapOptions {
        &self.options
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn state(&self, idx: usize) -> InteractionState {
        self.controller.state(idx)
    }

    pub fn pinned(&self) -> Option<usize> {
        self.controller.lock().owner()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_animating(&self) -> bool {
        !self.scheduler.is_idle()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    // ========================================================================
    // Rebuild
    // ========================================================================

    fn redraw(&mut self, change: impl FnOnce(&mut RouteModel)) {
        let focus_key = self
            .focused
            .and_then(|idx| self.model.entry(idx))
            .map(|entry| entry.key.clone());

        self.teardown();
        change(&mut self.model);
        self.install();

        if let Some(key) = focus_key {
            self.restore_focus(&key);
        }
    }

    /// Re-focus the connection known as `key` in the rebuilt table
    ///
    /// While a pin is held the focus is only recorded; the lock keeps the
    /// tooltip.
    fn restore_focus(&mut self, key: &ConnectionKey) {
        let Some(index) = self.model.entries().iter().position(|e| e.key == *key) else {
            return;
        };
        self.focused = Some(index);
        self.handle(InteractionEvent::FocusIn { index });
    }

    /// Remove every binding and primitive of the current geometry
    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if let Some(id) = self.outside_listener.take() {
            self.surface.unwatch_outside_pointer(id);
        }
        for slot in self.slots.drain(..) {
            self.surface.remove(slot.path);
            self.surface.remove(slot.hit);
            if let Some(marker) = slot.marker {
                self.surface.remove(marker);
            }
        }
        for id in self.point_markers.drain(..) {
            self.surface.remove(id);
        }
        if self.tooltip.visible {
            self.surface.hide_tooltip();
        }
        self.tooltip = TooltipState::default();
        self.hovered = None;
        self.focused = None;
    }

    /// Create primitives, re-derive interaction state and start animations
    fn install(&mut self) {
        let size = self.model.size();

        for (idx, entry) in self.model.entries().iter().enumerate() {
            if !entry.curve.is_finite() {
                tracing::warn!(
                    index = idx,
                    key = %entry.key,
                    "Connection projects to non-finite geometry"
                );
            }
            let style = self.path_style(idx, false);
            let path = self.surface.create_path(&entry.curve, &style);
            if self.options.draw_animation {
                self.surface.set_reveal(path, 0.0);
            }
            let region = HitRegion {
                index: idx,
                label: self.model.accessible_label(idx),
                width: self.hit_width(idx),
            };
            let hit = self.surface.create_hit_region(&entry.curve, &region);
            self.slots.push(RouteSlot {
                path,
                hit,
                marker: None,
            });
        }

        let point_style = MarkerStyle {
            kind: MarkerKind::Point,
            fill: self.options.colors.point.clone(),
            radius: POINT_RADIUS,
        };
        for point in self.model.points().iter() {
            let id = self.surface.create_marker(point.position, &point_style);
            self.point_markers.push(id);
        }

        let effects = self.controller.rebuild(self.model.keys());
        self.apply(effects);

        let now = self.clock.now();
        let trail_style = MarkerStyle {
            kind: MarkerKind::Travelling,
            fill: self.options.colors.trail.clone(),
            radius: MARKER_RADIUS,
        };
        for idx in 0..self.slots.len() {
            if self.options.draw_animation {
                let key = TaskKey {
                    connection: idx,
                    kind: AnimationKind::Reveal,
                };
                self.scheduler.start(key, now, REVEAL_DURATION);
            }
            if self.shows_marker(idx) {
                let Some(entry) = self.model.entry(idx) else {
                    continue;
                };
                let id = self.surface.create_marker(entry.curve.start, &trail_style);
                self.slots[idx].marker = Some(id);
                let key = TaskKey {
                    connection: idx,
                    kind: AnimationKind::Marker,
                };
                self.scheduler.start(key, now, marker_duration(idx));
            }
        }
        if !self.scheduler.is_idle() {
            self.surface.request_frame();
        }

        tracing::debug!(
            routes = self.model.len(),
            points = self.model.points().len(),
            width = size.width,
            height = size.height,
            "Rebuilt arc map"
        );
    }

    // ========================================================================
    // Effects
    // ========================================================================

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Highlight { index, on } => {
                    if let Some(slot) = self.slots.get(index) {
                        let style = self.path_style(index, on);
                        self.surface.restyle_path(slot.path, &style);
                    }
                }
                Effect::ShowTooltip {
                    index,
                    anchor,
                    pinned,
                } => self.show_tooltip(index, anchor, pinned),
                Effect::MoveTooltip { at } => self.move_tooltip(at),
                Effect::HideTooltip => {
                    self.surface.hide_tooltip();
                    self.tooltip = TooltipState::default();
                }
                Effect::AttachOutsideListener => {
                    if self.outside_listener.is_none() {
                        self.outside_listener = Some(self.surface.watch_outside_pointer());
                    }
                }
                Effect::DetachOutsideListener => {
                    if let Some(id) = self.outside_listener.take() {
                        self.surface.unwatch_outside_pointer(id);
                    }
                }
            }
        }
    }

    fn show_tooltip(&mut self, index: usize, anchor: TooltipAnchor, pinned: bool) {
        let (Some(conn), Some(entry)) = (self.model.connection(index), self.model.entry(index))
        else {
            return;
        };
        let content = match &self.options.tooltip.render {
            Some(render) => render(conn),
            None => default_content(conn),
        };
        let class = self.options.tooltip.class_name.as_deref();
        let measured = self.surface.measure_tooltip(&content, class);

        let raw = match anchor {
            TooltipAnchor::Pointer(at) => self.positioner.anchor_for_pointer(at),
            TooltipAnchor::Midpoint => self.positioner.anchor_for_curve(&entry.curve),
        };
        let placement = self.positioner.place(raw, measured, self.model.size());
        self.surface.show_tooltip(&content, &placement, pinned, class);

        self.tooltip = TooltipState {
            visible: true,
            content: Some(content),
            anchor: Some(placement.anchor),
            pinned,
            owner: Some(index),
            size: measured,
        };
    }

    fn move_tooltip(&mut self, at: SurfacePoint) {
        if !self.tooltip.visible || self.tooltip.pinned {
            return;
        }
        let Some(content) = &self.tooltip.content else {
            return;
        };
        let anchor = self.positioner.anchor_for_pointer(at);
        let placement = self
            .positioner
            .place(anchor, self.tooltip.size, self.model.size());
        let class = self.options.tooltip.class_name.as_deref();
        self.surface.show_tooltip(content, &placement, false, class);
        self.tooltip.anchor = Some(placement.anchor);
    }

    // ========================================================================
    // Per-connection style resolution
    // ========================================================================

    fn path_style(&self, idx: usize, highlighted: bool) -> PathStyle {
        let conn = self.model.connection(idx);
        let base_color = conn
            .and_then(|c| c.color.clone())
            .unwrap_or_else(|| self.options.colors.arc.clone());
        let base_width = self.stroke_width(idx);

        if !highlighted {
            return PathStyle {
                stroke: base_color,
                width: base_width,
                highlighted: false,
            };
        }
        PathStyle {
            stroke: conn
                .and_then(|c| c.hover_color.clone())
                .unwrap_or_else(|| self.options.colors.trail.clone()),
            width: conn
                .and_then(|c| c.hover_width)
                .unwrap_or(base_width + HOVER_WIDTH_BONUS),
            highlighted: true,
        }
    }

    fn stroke_width(&self, idx: usize) -> f64 {
        self.model
            .connection(idx)
            .and_then(|c| c.stroke_width)
            .unwrap_or(self.options.stroke_width)
    }

    fn hit_width(&self, idx: usize) -> f64 {
        self.options.hit_width.max(self.stroke_width(idx))
    }

    fn shows_marker(&self, idx: usize) -> bool {
        self.model
            .connection(idx)
            .and_then(|c| c.show_marker)
            .unwrap_or(self.options.show_markers)
    }
}

impl<S: SurfaceAdapter, C: Clock> Drop for ArcMap<S, C> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Surface size after applying fixed width/height options
fn effective_size(options: &ArcMapOptions, container: SurfaceSize) -> SurfaceSize {
    SurfaceSize::new(
        options.width.unwrap_or(container.width),
        options.height.unwrap_or(container.height),
    )
}

/// Tooltip content used when no renderer is configured
pub fn default_content(conn: &Connection) -> TooltipContent {
    let route = format!("{} → {}", place_name(&conn.from), place_name(&conn.to));
    match &conn.label {
        Some(label) if !label.title.is_empty() => TooltipContent::Structured {
            title: label.title.clone(),
            subtitle: label.subtitle.clone(),
            lines: vec![route],
        },
        Some(label) => TooltipContent::Structured {
            title: route,
            subtitle: label.subtitle.clone(),
            lines: Vec::new(),
        },
        None => TooltipContent::Structured {
            title: route,
            subtitle: None,
            lines: Vec::new(),
        },
    }
}

fn place_name(point: &GeoPoint) -> String {
    match &point.label {
        Some(label) => label.clone(),
        None => {
            let ns = if point.latitude < 0.0 { 'S' } else { 'N' };
            let ew = if point.longitude < 0.0 { 'W' } else { 'E' };
            format!(
                "{:.2}°{} {:.2}°{}",
                point.latitude.abs(),
                ns,
                point.longitude.abs(),
                ew
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::config::{ColorsPatch, TooltipPatch, MARKER_BASE_DURATION};
    use super::*;
    use crate::animation::ManualClock;
    use crate::surface::recording::RecordingSurface;
    use crate::tooltip::FollowMode;
    use std::rc::Rc;
    use std::time::Duration;

    type TestMap = ArcMap<RecordingSurface, ManualClock>;

    fn nyc() -> GeoPoint {
        GeoPoint::labeled(40.7128, -74.006, "New York")
    }

    fn london() -> GeoPoint {
        GeoPoint::labeled(51.5074, -0.1278, "London")
    }

    fn tokyo() -> GeoPoint {
        GeoPoint::labeled(35.6762, 139.6503, "Tokyo")
    }

    fn rio() -> GeoPoint {
        GeoPoint::labeled(-22.9068, -43.1729, "Rio de Janeiro")
    }

    fn routes() -> Vec<Connection> {
        vec![
            Connection::new(nyc(), london()).id("nyc-lon"),
            Connection::new(nyc(), rio()).id("nyc-rio").title("Southbound"),
        ]
    }

    fn map_with(options: ArcMapOptions) -> (TestMap, ManualClock) {
        let clock = ManualClock::new();
        let map = ArcMap::create_with_clock(
            RecordingSurface::new(1000.0, 600.0),
            clock.clone(),
            "#map",
            options,
        )
        .unwrap();
        (map, clock)
    }

    fn map() -> (TestMap, ManualClock) {
        map_with(ArcMapOptions::default().with_connections(routes()))
    }

    fn on_route(map: &TestMap, idx: usize) -> SurfacePoint {
        map.model().entry(idx).unwrap().curve.point_at_fraction(0.5)
    }

    #[test]
    fn test_missing_container() {
        let err = ArcMap::create(
            RecordingSurface::new(100.0, 100.0),
            "#nope",
            ArcMapOptions::default(),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            ArcMapError::ContainerNotFound {
                container: "#nope".into()
            }
        );
        assert_eq!(err.to_string(), "container not found: #nope");
    }

    #[test]
    fn test_create_renders_routes_and_unique_points() {
        let (map, _) = map();
        let s = map.surface();

        assert_eq!(s.paths().len(), 2);
        assert_eq!(s.hit_regions().len(), 2);
        assert_eq!(s.markers(MarkerKind::Point).len(), 3);
        assert_eq!(s.markers(MarkerKind::Travelling).len(), 2);
        assert!(s.paths().iter().all(|(_, _, reveal)| *reveal == 0.0));
        assert_eq!(s.observers.len(), 1);
        assert!(s.frame_requests > 0);
        assert!(map.is_animating());

        let labels: Vec<&str> = s.hit_regions().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["nyc-lon", "Southbound"]);
    }

    #[test]
    fn test_reveal_progresses_then_stops() {
        let (mut map, clock) = map();

        clock.advance(Duration::from_millis(500));
        assert!(map.tick());
        assert!(map
            .surface()
            .paths()
            .iter()
            .all(|(_, _, reveal)| (*reveal - 0.5).abs() < 1e-9));

        clock.advance(Duration::from_millis(500));
        map.tick();
        assert!(map.surface().paths().iter().all(|(_, _, r)| *r == 1.0));

        clock.advance(MARKER_BASE_DURATION * 2);
        assert!(!map.tick());
        assert!(!map.is_animating());
        assert!(map.surface().markers(MarkerKind::Travelling).is_empty());

        let requests = map.surface().frame_requests;
        assert!(!map.tick());
        assert_eq!(map.surface().frame_requests, requests);
    }

    #[test]
    fn test_travelling_marker_follows_curve() {
        let (mut map, clock) = map();
        let start = map.model().entry(0).unwrap().curve.start;
        clock.advance(Duration::from_millis(1200));
        map.tick();

        let moved = map.surface().markers(MarkerKind::Travelling);
        assert!(moved.iter().all(|p| *p != start));
    }

    #[test]
    fn test_animations_disabled() {
        let mut options = ArcMapOptions::default().with_connections(routes());
        options.draw_animation = false;
        options.show_markers = false;
        let (map, _) = map_with(options);

        let s = map.surface();
        assert!(s.paths().iter().all(|(_, _, reveal)| *reveal == 1.0));
        assert!(s.markers(MarkerKind::Travelling).is_empty());
        assert_eq!(s.frame_requests, 0);
        assert!(!map.is_animating());
    }

    #[test]
    fn test_per_connection_marker_opt_out() {
        let conns = vec![
            Connection::new(nyc(), london()).show_marker(false),
            Connection::new(nyc(), rio()),
        ];
        let (map, _) = map_with(ArcMapOptions::default().with_connections(conns));
        assert_eq!(map.surface().markers(MarkerKind::Travelling).len(), 1);
    }

    #[test]
    fn test_hover_highlights_and_shows_tooltip() {
        let (mut map, _) = map();
        let at = on_route(&map, 0);
        map.pointer_moved(at);

        assert_eq!(map.hovered(), Some(0));
        assert_eq!(map.state(0), InteractionState::Hovered);
        let (_, style, _) = map.surface().paths()[0];
        assert!(style.highlighted);
        assert_eq!(style.stroke, "#ffffff");
        assert_eq!(style.width, 6.0);

        let shown = map.surface().tooltip.clone().unwrap();
        assert!(!shown.pinned);
        assert_eq!(
            shown.content.text_lines(),
            vec!["New York → London".to_string()]
        );

        map.pointer_left();
        assert!(map.surface().tooltip.is_none());
        assert!(!map.surface().paths()[0].1.highlighted);
        assert!(!map.tooltip().visible);
    }

    #[test]
    fn test_pointer_move_follows_cursor() {
        let (mut map, _) = map();
        let a = on_route(&map, 0);
        map.pointer_moved(a);
        let first = map.tooltip().anchor.unwrap();

        let b = map.model().entry(0).unwrap().curve.point_at_fraction(0.55);
        map.pointer_moved(b);
        assert_ne!(map.tooltip().anchor.unwrap(), first);
        assert_eq!(map.surface().measure_calls, 1);
    }

    #[test]
    fn test_click_pins_and_outside_releases() {
        let (mut map, _) = map();
        let at = on_route(&map, 1);
        assert!(map.pointer_pressed(at));

        assert_eq!(map.pinned(), Some(1));
        assert_eq!(map.surface().listeners.len(), 1);
        assert!(map.surface().tooltip.as_ref().unwrap().pinned);

        // Hover elsewhere is ignored while pinned
        map.pointer_moved(on_route(&map, 0));
        assert_eq!(map.state(0), InteractionState::Idle);

        map.outside_pointer();
        assert_eq!(map.pinned(), None);
        assert!(map.surface().listeners.is_empty());
        assert!(map.surface().tooltip.is_none());
    }

    #[test]
    fn test_press_off_route_does_nothing() {
        let (mut map, _) = map();
        assert!(map.pointer_pressed(on_route(&map, 0)));
        assert!(!map.pointer_pressed(SurfacePoint::new(1.0, 599.0)));
        assert_eq!(map.pinned(), Some(0));
    }

    #[test]
    fn test_topmost_route_wins() {
        let conns = vec![
            Connection::new(nyc(), london()),
            Connection::new(nyc(), london()),
        ];
        let (map, _) = map_with(ArcMapOptions::default().with_connections(conns));
        assert_eq!(map.hit_test(on_route(&map, 0)), Some(1));
    }

    #[test]
    fn test_pin_survives_replacement_by_id() {
        let (mut map, _) = map();
        map.pointer_pressed(on_route(&map, 1));

        let mut reordered = routes();
        reordered.reverse();
        map.set_connections(reordered);

        assert_eq!(map.pinned(), Some(0));
        assert_eq!(map.state(0), InteractionState::Pinned);
        assert_eq!(map.surface().listeners.len(), 1);
        assert!(map.surface().tooltip.as_ref().unwrap().pinned);
    }

    #[test]
    fn test_pin_dropped_when_route_removed() {
        let (mut map, _) = map();
        map.pointer_pressed(on_route(&map, 1));
        map.set_connections(vec![Connection::new(london(), tokyo())]);

        assert_eq!(map.pinned(), None);
        assert!(map.surface().listeners.is_empty());
        assert!(map.surface().tooltip.is_none());
        assert_eq!(map.surface().paths().len(), 1);
        assert_eq!(map.surface().markers(MarkerKind::Point).len(), 2);
    }

    #[test]
    fn test_resize_rebuilds_only_on_change() {
        let (mut map, _) = map();
        let before: Vec<PrimitiveId> = map.surface().paths().iter().map(|p| p.0).collect();

        map.on_resize(SurfaceSize::new(1000.0, 600.0));
        let same: Vec<PrimitiveId> = map.surface().paths().iter().map(|p| p.0).collect();
        assert_eq!(before, same);

        map.on_resize(SurfaceSize::new(500.0, 300.0));
        let after: Vec<PrimitiveId> = map.surface().paths().iter().map(|p| p.0).collect();
        assert_ne!(before, after);
        assert_eq!(map.model().size(), SurfaceSize::new(500.0, 300.0));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_fixed_size_ignores_container() {
        let mut options = ArcMapOptions::default().with_connections(routes());
        options.width = Some(400.0);
        let (mut map, _) = map_with(options);
        assert_eq!(map.model().size(), SurfaceSize::new(400.0, 600.0));

        map.on_resize(SurfaceSize::new(800.0, 600.0));
        assert_eq!(map.model().size(), SurfaceSize::new(400.0, 600.0));
    }

    #[test]
    fn test_update_merges_and_rebuilds() {
        let (mut map, _) = map();
        map.update(OptionsPatch {
            curvature: Some(0.0),
            colors: Some(ColorsPatch {
                arc: Some("#123456".into()),
                ..Default::default()
            }),
            tooltip: Some(TooltipPatch {
                follow: Some(FollowMode::Midpoint),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(map.model().entry(0).unwrap().curve.lift(), 0.0);
        assert!(map
            .surface()
            .paths()
            .iter()
            .all(|(_, style, _)| style.stroke == "#123456"));
        assert_eq!(map.options().tooltip.follow, FollowMode::Midpoint);
        assert_eq!(map.model().len(), 2);
    }

    #[test]
    fn test_keyboard_focus_wraps_and_escape_unpins() {
        let (mut map, _) = map();
        map.focus_prev();
        assert_eq!(map.focused(), Some(1));
        map.focus_next();
        assert_eq!(map.focused(), Some(0));
        assert_eq!(map.state(0), InteractionState::Focused);
        assert_eq!(map.state(1), InteractionState::Idle);

        map.activate_focused();
        assert_eq!(map.pinned(), Some(0));
        map.escape();
        assert_eq!(map.pinned(), None);

        map.blur();
        assert_eq!(map.focused(), None);
    }

    #[test]
    fn test_focus_survives_rebuild() {
        let (mut map, _) = map();
        map.focus_next();
        map.focus_next();
        assert_eq!(map.focused(), Some(1));

        map.update(OptionsPatch {
            curvature: Some(0.3),
            ..Default::default()
        });
        assert_eq!(map.focused(), Some(1));
        assert_eq!(map.state(1), InteractionState::Focused);
        assert!(map.tooltip().visible);

        map.on_resize(SurfaceSize::new(800.0, 500.0));
        assert_eq!(map.focused(), Some(1));

        map.activate_focused();
        assert_eq!(map.pinned(), Some(1));

        // Focus follows the id when the list is reordered
        map.set_connections(routes().into_iter().rev().collect());
        assert_eq!(map.focused(), Some(0));
        assert_eq!(map.pinned(), Some(0));
    }

    #[test]
    fn test_duplicate_ids_keep_pin_in_place() {
        let (mut map, _) = map_with(ArcMapOptions::default().with_connections(vec![
            Connection::new(nyc(), london()).id("x"),
            Connection::new(nyc(), rio()).id("x"),
        ]));
        let at = on_route(&map, 1);
        map.pointer_pressed(at);
        assert_eq!(map.pinned(), Some(1));

        let same = map.model().connections().to_vec();
        map.set_connections(same);
        assert_eq!(map.pinned(), Some(1));
        assert_eq!(map.state(0), InteractionState::Idle);
    }

    #[test]
    fn test_custom_renderer_and_class() {
        let mut options = ArcMapOptions::default().with_connections(routes());
        options.tooltip.render = Some(Rc::new(|c: &Connection| {
            TooltipContent::Text(c.id.clone().unwrap_or_default())
        }));
        options.tooltip.class_name = Some("dark".into());
        let (mut map, _) = map_with(options);

        map.focus_next();
        let shown = map.surface().tooltip.clone().unwrap();
        assert_eq!(shown.content, TooltipContent::Text("nyc-lon".into()));
        assert_eq!(shown.class.as_deref(), Some("dark"));
    }

    #[test]
    fn test_tooltip_clamped_near_edge() {
        let conns = vec![Connection::new(
            GeoPoint::new(70.0, -179.0),
            GeoPoint::new(70.0, -170.0),
        )];
        let (mut map, _) = map_with(ArcMapOptions::default().with_connections(conns));
        map.pointer_moved(on_route(&map, 0));

        let p = map.surface().tooltip.as_ref().unwrap().placement;
        assert!(p.left >= TOOLTIP_PADDING);
        assert!(p.top >= TOOLTIP_PADDING);
    }

    #[test]
    fn test_destroy_is_idempotent_and_final() {
        let (mut map, clock) = map();
        map.pointer_pressed(on_route(&map, 0));
        map.destroy();

        let s = map.surface();
        assert!(s.primitives.is_empty());
        assert!(s.listeners.is_empty());
        assert!(s.observers.is_empty());
        assert!(s.tooltip.is_none());
        assert!(map.is_destroyed());

        map.destroy();
        map.set_connections(routes());
        map.focus_next();
        clock.advance(Duration::from_millis(100));
        assert!(!map.tick());
        assert!(map.surface().primitives.is_empty());
    }

    #[test]
    fn test_default_content_without_labels() {
        let conn = Connection::new(GeoPoint::new(-33.5, 151.25), GeoPoint::new(0.0, 0.0));
        assert_eq!(
            default_content(&conn).text_lines(),
            vec!["33.50°S 151.25°E → 0.00°N 0.00°E".to_string()]
        );

        let conn = Connection::new(nyc(), london()).title("Atlantic").subtitle("daily");
        assert_eq!(
            default_content(&conn).text_lines(),
            vec!["Atlantic", "daily", "New York → London"]
        );
    }

    #[test]
    fn test_empty_connection_list() {
        let (map, _) = map_with(ArcMapOptions::default());
        assert!(map.surface().primitives.is_empty());
        assert!(!map.is_animating());
    }
}
