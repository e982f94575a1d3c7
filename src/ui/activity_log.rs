// Activity log rendering module
//
// Renders the selection history, newest first, with the status color of
// each selected node at the time it is drawn.

use crate::app::{AppState, SelectionLogEntry};
use crate::scene::StyleTable;
use crate::theme::{to_color, BONE_WHITE, PUMPKIN_ORANGE};
use crate::topology::Graph;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};
use std::time::Duration;

/// Elapsed time as `mm:ss.t`
pub fn format_elapsed(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    let minutes = tenths / 600;
    let seconds = (tenths / 10) % 60;
    format!("{:02}:{:02}.{}", minutes, seconds, tenths % 10)
}

fn entry_line(entry: &SelectionLogEntry, graph: &Graph, styles: &StyleTable) -> Line<'static> {
    let time = Span::styled(
        format!(" {} ", format_elapsed(entry.at)),
        Style::default().fg(Color::DarkGray),
    );

    let Some(id) = &entry.selected else {
        return Line::from(vec![
            time,
            Span::styled(
                "selection cleared",
                Style::default()
                    .fg(BONE_WHITE)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]);
    };

    // The node may be gone after a rebuild; fall back to the bare id
    let (label, color) = match graph.get(id.as_str()) {
        Some(node) => (
            node.label.clone(),
            styles
                .get(node.status)
                .map(|style| to_color(style.color))
                .unwrap_or(BONE_WHITE),
        ),
        None => (id.to_string(), BONE_WHITE),
    };

    Line::from(vec![
        time,
        Span::raw("selected "),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" [{}]", id), Style::default().fg(Color::DarkGray)),
    ])
}

pub fn render_activity_log(f: &mut Frame, area: Rect, app: &AppState) {
    let styles = StyleTable::default();
    let items: Vec<ListItem> = app
        .selection_log
        .iter()
        .map(|entry| ListItem::new(entry_line(entry, &app.graph, &styles)))
        .collect();

    let title = format!("━ 📜 Selections ({}) ", app.selection_log.len());

    let list = List::new(items).block(
        Block::default()
            .title(vec![
                Span::styled(
                    title,
                    Style::default()
                        .fg(PUMPKIN_ORANGE)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("━━━━━━━", Style::default().fg(PUMPKIN_ORANGE)),
            ])
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(PUMPKIN_ORANGE)),
    );

    f.render_widget(list, area);
}
