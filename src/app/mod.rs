// Application state management
//
// This module contains the main AppState struct, which owns the map engine
// bound to the terminal surface, and re-exports configuration types from the
// config submodule.

pub mod config;
pub mod event;

pub use config::{sample_routes, MapSettings, CHANGE_HIGHLIGHT_DURATION};

use std::time::Instant;

use anyhow::Context;
use arcmap::engine::config::TooltipPatch;
use arcmap::surface::terminal::{TerminalSurface, CONTAINER};
use arcmap::{ArcMap, ArcMapOptions, Connection, OptionsPatch};
use ratatui::layout::Rect;

use config::{CURVATURE_STEP, MAX_CURVATURE, MIN_CURVATURE, PULSE_STEP, TICK_INTERVAL_MS};

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Map engine drawing into the terminal surface
    pub map: ArcMap<TerminalSurface>,

    /// Routes handed to the engine (kept for replay)
    pub routes: Vec<Connection>,

    /// Runtime-adjustable map settings
    pub settings: MapSettings,

    /// Pulse phase for the pinned tooltip border (0.0 ~ 1.0)
    pub pulse_phase: f32,

    /// Last tick time for pulse animation
    pub last_tick: Instant,

    /// Timestamp of the last curvature change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl AppState {
    /// Create the app with the map occupying `map_area`
    pub fn new(map_area: Rect) -> anyhow::Result<Self> {
        let settings = MapSettings::default();
        let routes = sample_routes();

        let mut options = ArcMapOptions::default().with_connections(routes.clone());
        options.draw_animation = settings.draw_animation;
        options.show_markers = settings.show_markers;
        options.curvature = settings.curvature;
        options.stroke_width = settings.stroke_width;
        options.tooltip.follow = settings.follow;

        let map = ArcMap::create(TerminalSurface::new(map_area), CONTAINER, options)
            .context("failed to bind the map to the terminal surface")?;

        Ok(Self {
            running: true,
            map,
            routes,
            settings,
            pulse_phase: 0.0,
            last_tick: Instant::now(),
            last_change: None,
        })
    }

    /// Update state once per frame
    ///
    /// Forwards a pending resize to the engine and advances its animations if
    /// it asked for a frame.
    pub fn on_tick(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_tick).as_millis() >= TICK_INTERVAL_MS {
            self.last_tick = now;
            self.pulse_phase += PULSE_STEP;
            if self.pulse_phase >= 1.0 {
                self.pulse_phase = 0.0;
            }
        }

        if let Some(size) = self.map.surface_mut().take_resize() {
            self.map.on_resize(size);
        }
        if self.map.surface_mut().take_frame_request() {
            self.map.tick();
        }
    }

    /// Tell the surface where the map is drawn this frame
    pub fn set_map_area(&mut self, area: Rect) {
        self.map.surface_mut().set_area(area);
    }

    pub fn toggle_draw_animation(&mut self) {
        self.settings.draw_animation = !self.settings.draw_animation;
        self.map.update(OptionsPatch {
            draw_animation: Some(self.settings.draw_animation),
            ..Default::default()
        });
    }

    pub fn toggle_markers(&mut self) {
        self.settings.show_markers = !self.settings.show_markers;
        self.map.update(OptionsPatch {
            show_markers: Some(self.settings.show_markers),
            ..Default::default()
        });
    }

    pub fn toggle_follow_mode(&mut self) {
        self.settings.follow = self.settings.follow.toggled();
        self.map.update(OptionsPatch {
            tooltip: Some(TooltipPatch {
                follow: Some(self.settings.follow),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    /// Bow routes further (clamp to MAX_CURVATURE)
    pub fn increase_curvature(&mut self) {
        self.set_curvature(self.settings.curvature + CURVATURE_STEP);
    }

    /// Flatten routes (clamp to MIN_CURVATURE)
    pub fn decrease_curvature(&mut self) {
        self.set_curvature(self.settings.curvature - CURVATURE_STEP);
    }

    fn set_curvature(&mut self, curvature: f64) {
        // Round away float drift so repeated steps land on exact values
        let curvature = (curvature.clamp(MIN_CURVATURE, MAX_CURVATURE) * 100.0).round() / 100.0;
        if curvature == self.settings.curvature {
            return;
        }
        self.settings.curvature = curvature;
        self.last_change = Some(Instant::now());
        self.map.update(OptionsPatch {
            curvature: Some(curvature),
            ..Default::default()
        });
    }

    /// Replace every route with the same set, replaying the animations
    pub fn replay(&mut self) {
        tracing::debug!(routes = self.routes.len(), "Replaying routes");
        self.map.set_connections(self.routes.clone());
    }

    /// Whether the curvature changed within CHANGE_HIGHLIGHT_DURATION
    pub fn curvature_recently_changed(&self) -> bool {
        self.last_change
            .is_some_and(|t| t.elapsed() < CHANGE_HIGHLIGHT_DURATION)
    }

    /// Tear the map down; the terminal can be restored afterwards
    pub fn shutdown(&mut self) {
        self.running = false;
        self.map.destroy();
    }
}
