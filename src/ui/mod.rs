// UI rendering module
//
// This module contains all UI rendering components for nettopo.
// The main draw() function orchestrates rendering of all UI panels; the
// layout is shared with the host loop so the map surface always matches
// the cells the map canvas is drawn into.

mod activity_log;
mod inspector;
mod status_bar;
mod topology_map;

use crate::app::AppState;
use crate::theme::NEON_PURPLE;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use std::time::Instant;

use activity_log::render_activity_log;
use inspector::render_inspector;
use status_bar::render_status_bar;
use topology_map::render_topology_map;

/// Cell areas of every panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub map: Rect,
    pub inspector: Rect,
    pub activity_log: Rect,
    pub status_bar: Rect,
}

pub fn panel_layout(size: Rect) -> PanelLayout {
    // Main layout: body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    // Body: map + right panels
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Topology map
            Constraint::Percentage(35), // Right panels
        ])
        .split(chunks[0]);

    // Right side: inspector + activity log
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(65), // Inspector
            Constraint::Percentage(35), // Activity log
        ])
        .split(body_chunks[1]);

    PanelLayout {
        map: body_chunks[0],
        inspector: right_chunks[0],
        activity_log: right_chunks[1],
        status_bar: chunks[1],
    }
}

/// Border drawn around the map canvas
fn map_block() -> Block<'static> {
    Block::default()
        .title(Span::styled(
            "━ 🌐 Network Topology ",
            Style::default()
                .fg(NEON_PURPLE)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEON_PURPLE))
}

/// Cells the map canvas covers for a given terminal size
pub fn map_canvas_area(size: Rect) -> Rect {
    map_block().inner(panel_layout(size).map)
}

/// Main UI drawing function
///
/// `now` is the tick time the frame was produced for.
pub fn draw(f: &mut Frame, app: &mut AppState, now: Instant) {
    let layout = panel_layout(f.area());

    let block = map_block();
    let canvas_area = block.inner(layout.map);
    f.render_widget(block, layout.map);
    render_topology_map(f, canvas_area, app);

    render_inspector(f, layout.inspector, app, now);
    render_activity_log(f, layout.activity_log, app);
    render_status_bar(f, layout.status_bar, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::TerminalSurface;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_map_canvas_area_is_inside_map_panel() {
        let size = Rect::new(0, 0, 120, 40);
        let layout = panel_layout(size);
        let canvas = map_canvas_area(size);

        assert_eq!(canvas.x, layout.map.x + 1);
        assert_eq!(canvas.y, layout.map.y + 1);
        assert_eq!(canvas.width, layout.map.width - 2);
        assert_eq!(canvas.height, layout.map.height - 2);
        assert_eq!(layout.status_bar.height, 3);
    }

    #[test]
    fn test_draw_renders_all_panels() {
        let size = Rect::new(0, 0, 120, 40);
        let now = Instant::now();
        let surface = TerminalSurface::headless(map_canvas_area(size));
        let mut app = AppState::new(surface, now).unwrap();
        app.select_next_node();
        app.on_tick(now);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &mut app, now)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Network Topology"));
        assert!(text.contains("Main Router"));
        assert!(text.contains("192.168.1.1"));
        assert!(text.contains("Selections"));
    }
}
