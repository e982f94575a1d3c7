// Inspector rendering module
//
// Renders the node list (one row per node, follows the selection) and the
// detail panel for the selected node.

use super::topology_map::category_glyph;
use crate::app::config::{MAX_TARGET_FPS, MIN_TARGET_FPS};
use crate::app::AppState;
use crate::scene::StyleTable;
use crate::scheduler::DEFAULT_TARGET_FPS;
use crate::theme::{
    frame_rate_color, to_color, BLOOD_RED, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE, TOXIC_GREEN,
};
use crate::topology::{NetworkNode, NodeStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::time::Instant;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest label shown in the node list before truncation
const LABEL_COLUMNS: usize = 18;

// ============================================================================
// Inspector View Model
// ============================================================================

/// Everything the detail panel shows about the selected node
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    pub label: String,
    pub id: String,
    pub glyph: &'static str,
    pub category: &'static str,
    pub status: NodeStatus,
    pub ip: String,
    pub services: Vec<String>,
    pub threat_count: u32,
    pub connection_count: usize,
}

/// Build the detail view for the selected node, if any
pub fn build_inspector_view(app: &AppState) -> Option<InspectorView> {
    let id = app.viewport.selected()?;
    let idx = app.graph.index_of(id.as_str())?;
    let node = &app.graph.nodes()[idx];
    let connection_count = app
        .graph
        .edges()
        .iter()
        .filter(|edge| edge.a == idx || edge.b == idx)
        .count();

    Some(InspectorView {
        label: node.label.clone(),
        id: node.id.to_string(),
        glyph: category_glyph(node.category),
        category: node.category.name(),
        status: node.status,
        ip: node.ip.clone(),
        services: node.services.clone(),
        threat_count: node.threat_count,
        connection_count,
    })
}

/// Cut `text` to at most `columns` terminal columns, marking the cut with '…'
pub fn truncate_to_width(text: &str, columns: usize) -> String {
    if text.width() <= columns {
        return text.to_string();
    }
    if columns == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > columns - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn status_color(status: NodeStatus) -> Color {
    StyleTable::default()
        .get(status)
        .map(|style| to_color(style.color))
        .unwrap_or(BONE_WHITE)
}

fn node_row(node: &NetworkNode) -> ListItem<'static> {
    let color = status_color(node.status);
    let label = truncate_to_width(&node.label, LABEL_COLUMNS);
    let padding = " ".repeat(LABEL_COLUMNS.saturating_sub(label.width()));

    let mut spans = vec![
        Span::styled(
            format!(" {} ", category_glyph(node.category)),
            Style::default().fg(color),
        ),
        Span::styled(format!("{}{}", label, padding), Style::default().fg(BONE_WHITE)),
        Span::styled(format!(" {:<15}", node.ip), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" {}", node.status.name()),
            Style::default().fg(color),
        ),
    ];
    if node.threat_count > 0 {
        spans.push(Span::styled(
            format!(" ⚠ {}", node.threat_count),
            Style::default().fg(BLOOD_RED).add_modifier(Modifier::BOLD),
        ));
    }
    ListItem::new(Line::from(spans))
}

pub fn render_inspector(f: &mut Frame, area: Rect, app: &mut AppState, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Node list
            Constraint::Length(9), // Details
        ])
        .split(area);

    let items: Vec<ListItem> = app.graph.nodes().iter().map(node_row).collect();
    let title = format!("━ 📋 Nodes ({}) ", app.graph.len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(vec![
                    Span::styled(
                        title,
                        Style::default()
                            .fg(NEON_PURPLE)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("━━━━━━", Style::default().fg(NEON_PURPLE)),
                ])
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(47, 51, 77)))
        .highlight_symbol("▶");

    f.render_stateful_widget(list, chunks[0], &mut app.node_list_state);

    let view = build_inspector_view(app);
    render_details(f, chunks[1], view.as_ref(), app, now);
}

/// Frame cap line; highlighted for a moment after the cap changes
fn frame_cap_line(app: &AppState, now: Instant) -> Line<'static> {
    let fps = app.frame_rate.target_fps;
    let fps_style = Style::default()
        .fg(frame_rate_color(
            fps,
            DEFAULT_TARGET_FPS,
            app.frame_rate.recently_changed(now),
        ))
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::raw("  ⚡ Frame cap: "),
        Span::styled(format!("{} fps", fps), fps_style),
        Span::styled(
            format!(" ({}-{})", MIN_TARGET_FPS, MAX_TARGET_FPS),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_details(
    f: &mut Frame,
    area: Rect,
    view: Option<&InspectorView>,
    app: &AppState,
    now: Instant,
) {
    let fps_line = frame_cap_line(app, now);

    let (content, border_color) = match view {
        None => (
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No node selected",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )),
                Line::from(Span::styled(
                    "  Click a node or use ↑↓",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                fps_line,
            ],
            NEON_PURPLE,
        ),
        Some(view) => {
            let color = status_color(view.status);
            let services = if view.services.is_empty() {
                "(none)".to_string()
            } else {
                view.services.join(", ")
            };
            let threat_color = if view.threat_count > 0 {
                BLOOD_RED
            } else {
                TOXIC_GREEN
            };
            let inner_width = area.width.saturating_sub(14) as usize;

            let lines = vec![
                Line::from(vec![
                    Span::raw("  NODE: "),
                    Span::styled(
                        format!("{} {}", view.glyph, view.label),
                        Style::default()
                            .fg(PUMPKIN_ORANGE)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" [{}]", view.id), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(vec![
                    Span::raw("  TYPE: "),
                    Span::styled(view.category, Style::default().fg(BONE_WHITE)),
                    Span::raw("  STATUS: "),
                    Span::styled(
                        view.status.name(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  IP: "),
                    Span::styled(view.ip.clone(), Style::default().fg(Color::Cyan)),
                    Span::raw("  |  Links: "),
                    Span::styled(view.connection_count.to_string(), Style::default().fg(Color::Gray)),
                ]),
                Line::from(vec![
                    Span::raw("  SERVICES: "),
                    Span::styled(
                        truncate_to_width(&services, inner_width),
                        Style::default().fg(BONE_WHITE),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  THREATS: "),
                    Span::styled(
                        view.threat_count.to_string(),
                        Style::default().fg(threat_color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                fps_line,
            ];
            let border = if view.status >= NodeStatus::Compromised {
                BLOOD_RED
            } else {
                NEON_PURPLE
            };
            (lines, border)
        }
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(vec![Span::styled(
                "━ 🔍 Inspector ",
                Style::default()
                    .fg(NEON_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )])
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color)),
    );

    f.render_widget(paragraph, area);
}
