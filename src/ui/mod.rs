// UI rendering module
//
// This module contains all UI rendering components for arcmap.
// The main draw() function orchestrates rendering of all UI panels.

mod map;
mod status_bar;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use map::render_map;
use status_bar::render_status_bar;

/// Split the screen into summary line, map canvas and status bar
fn layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Summary
            Constraint::Min(0),    // Map
            Constraint::Length(3), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Cells the map surface occupies on a screen of size `area`
pub fn map_area(area: Rect) -> Rect {
    map::canvas_inner(layout(area)[1])
}

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let [summary, body, status] = layout(f.area());

    app.set_map_area(map::canvas_inner(body));
    render_map(f, summary, body, app);
    render_status_bar(f, status, app);
}
