// Keyboard and mouse event handling
//
// This module translates terminal input into map operations: sequential
// focus, pin/unpin, pointer hover and presses, and the runtime toggles.

use super::AppState;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Key Bindings
/// - `q`, `Q` - Quit the application
/// - `Tab` / `BackTab` - Focus next / previous route
/// - `Enter` - Pin or unpin the focused route
/// - `Esc` - Unpin
/// - `+`, `=` - Increase curvature
/// - `-`, `_` - Decrease curvature
/// - `a`, `A` - Toggle draw-on animation
/// - `m`, `M` - Toggle travelling markers
/// - `f`, `F` - Toggle tooltip follow mode
/// - `r`, `R` - Replay (replace all routes with the same set)
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.running = false;
            false
        }
        KeyCode::Tab => {
            app.map.focus_next();
            true
        }
        KeyCode::BackTab => {
            app.map.focus_prev();
            true
        }
        KeyCode::Enter => {
            app.map.activate_focused();
            true
        }
        KeyCode::Esc => {
            app.map.escape();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.increase_curvature();
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.decrease_curvature();
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.toggle_draw_animation();
            true
        }
        KeyCode::Char('m') | KeyCode::Char('M') => {
            app.toggle_markers();
            true
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            app.toggle_follow_mode();
            true
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.replay();
            true
        }
        _ => true,
    }
}

/// Handle mouse events
///
/// Motion over the map hovers routes, motion elsewhere leaves the map. A left
/// press on the map pins or unpins the route under it; a left press anywhere
/// else counts as outside the map and releases a pin.
pub fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) {
    let at = app.map.surface().point_at(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => match at {
            Some(point) => app.map.pointer_moved(point),
            None => app.map.pointer_left(),
        },
        MouseEventKind::Down(MouseButton::Left) => match at {
            Some(point) => {
                app.map.pointer_pressed(point);
            }
            None => app.map.outside_pointer(),
        },
        _ => {}
    }
}
