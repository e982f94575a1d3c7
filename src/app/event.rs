// Keyboard and mouse event handling
//
// Translates crossterm input into application actions. Mouse input over
// the map panel becomes typed viewport events in viewport pixels.

use super::config::KEY_ORBIT_PIXELS;
use super::AppState;
use crate::viewport::{PointerButton, ViewportEvent};
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use std::time::Instant;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `Up` / `Down` - Select previous / next node
/// - `Left` / `Right` - Orbit the camera
/// - `z` / `x` - Zoom in / out
/// - `c` - Reset the camera
/// - `+`, `=` / `-`, `_` - Raise / lower the frame-rate ceiling
/// - `a` - Toggle animations
/// - `t` - Toggle node labels
/// - `g` - Swap between the baseline and degraded network
pub fn handle_key_event(app: &mut AppState, key: KeyCode, now: Instant) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.quit();
            false
        }
        KeyCode::Up => {
            app.select_previous_node();
            true
        }
        KeyCode::Down => {
            app.select_next_node();
            true
        }
        KeyCode::Left => {
            app.viewport.orbit(-KEY_ORBIT_PIXELS, 0.0);
            true
        }
        KeyCode::Right => {
            app.viewport.orbit(KEY_ORBIT_PIXELS, 0.0);
            true
        }
        KeyCode::Char('z') | KeyCode::Char('Z') => {
            app.viewport.zoom(1.0);
            true
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            app.viewport.zoom(-1.0);
            true
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.viewport.reset_camera();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.increase_frame_rate(now);
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.decrease_frame_rate(now);
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            // Also lets a reduced animation try full complexity again
            app.toggle_animations();
            true
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_labels();
            true
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            if let Err(e) = app.swap_network(now) {
                tracing::error!(error = %e, "Rejected network snapshot");
            }
            true
        }
        _ => true,
    }
}

/// Forward mouse input over the map panel to the viewport
///
/// Presses only start inside the panel; drags and releases keep tracking
/// at the panel edge once the pointer leaves it.
pub fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent, now: Instant) {
    let surface = app.viewport.surface();
    let event = match mouse.kind {
        MouseEventKind::Down(button) => {
            let Some((x, y)) = surface.to_viewport(mouse.column, mouse.row) else {
                return;
            };
            ViewportEvent::PointerDown {
                x,
                y,
                button: pointer_button(button),
            }
        }
        MouseEventKind::Drag(_) => {
            let (x, y) = surface.to_viewport_clamped(mouse.column, mouse.row);
            ViewportEvent::PointerMove { x, y }
        }
        MouseEventKind::Up(button) => {
            let (x, y) = surface.to_viewport_clamped(mouse.column, mouse.row);
            ViewportEvent::PointerUp {
                x,
                y,
                button: pointer_button(button),
            }
        }
        MouseEventKind::ScrollUp if surface.to_viewport(mouse.column, mouse.row).is_some() => {
            ViewportEvent::Wheel { notches: 1.0 }
        }
        MouseEventKind::ScrollDown if surface.to_viewport(mouse.column, mouse.row).is_some() => {
            ViewportEvent::Wheel { notches: -1.0 }
        }
        _ => return,
    };
    app.viewport.dispatch(event, now);
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}
