// Topology map rendering module
//
// Paints the latest presented draw list onto a Braille canvas. The canvas
// bounds are the [-1, 1] device square, so projected coordinates are used
// as-is; only horizontal sizes need the panel aspect.

use crate::app::AppState;
use crate::render::{DrawList, EdgeSegment, NodeSprite};
use crate::theme::{emphasis_color, to_color, BONE_WHITE, MAP_SHADOW};
use crate::topology::NodeCategory;
use crate::viewport::surface::CELL_ASPECT;
use glam::Vec2;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Context, Line as CanvasLine, Points},
    Frame,
};
use std::f32::consts::TAU;

/// Length of one dash (and one gap) in device units
const DASH_LENGTH: f32 = 0.05;

/// Points sampled around a proxy outline
const OUTLINE_SAMPLES: usize = 24;

/// Smallest drawn outline, so distant nodes stay visible
const MIN_OUTLINE_RADIUS: f32 = 0.02;

pub fn render_topology_map(f: &mut Frame, area: Rect, app: &AppState) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    // Horizontal device units per vertical device unit for round outlines
    let aspect = area.width as f32 / (area.height as f32 * CELL_ASPECT);
    let labels_enabled = app.display.labels_enabled;
    let empty = DrawList::default();
    let frame = app.viewport.surface().frame().unwrap_or(&empty);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            for edge in &frame.edges {
                draw_edge(ctx, edge);
            }

            // Outlines first, text on a later layer so glyphs stay readable
            for node in &frame.nodes {
                draw_outline(ctx, node, aspect);
            }
            ctx.layer();

            for node in &frame.nodes {
                draw_glyph(ctx, node, aspect, labels_enabled);
            }

            if frame.nodes.is_empty() {
                ctx.print(
                    -0.3,
                    0.0,
                    Span::styled(
                        "(nothing in view)",
                        Style::default().fg(BONE_WHITE).add_modifier(Modifier::ITALIC),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn draw_edge(ctx: &mut Context, edge: &EdgeSegment) {
    let color = to_color(edge.color);
    if !edge.dashed {
        ctx.draw(&CanvasLine {
            x1: edge.from.x as f64,
            y1: edge.from.y as f64,
            x2: edge.to.x as f64,
            y2: edge.to.y as f64,
            color,
        });
        return;
    }

    for (from, to) in dashes(edge.from, edge.to) {
        ctx.draw(&CanvasLine {
            x1: from.x as f64,
            y1: from.y as f64,
            x2: to.x as f64,
            y2: to.y as f64,
            color,
        });
    }
}

/// Split a segment into dashes of `DASH_LENGTH`, starting with a dash
fn dashes(from: Vec2, to: Vec2) -> Vec<(Vec2, Vec2)> {
    let length = from.distance(to);
    if !length.is_finite() || length <= DASH_LENGTH {
        return vec![(from, to)];
    }

    let steps = (length / DASH_LENGTH).ceil() as usize;
    (0..steps)
        .step_by(2)
        .map(|i| {
            let t0 = i as f32 * DASH_LENGTH / length;
            let t1 = ((i + 1) as f32 * DASH_LENGTH / length).min(1.0);
            (from.lerp(to, t0), from.lerp(to, t1))
        })
        .collect()
}

/// Proxy outline plus a spoke that turns with the idle rotation
fn draw_outline(ctx: &mut Context, node: &NodeSprite, aspect: f32) {
    let radius = node.radius.max(MIN_OUTLINE_RADIUS);
    let rx = radius / aspect;
    let color = if node.selected {
        to_color(node.color)
    } else {
        emphasis_color(node.color, node.emphasis)
    };

    let outline: Vec<(f64, f64)> = (0..OUTLINE_SAMPLES)
        .map(|i| {
            let angle = i as f32 / OUTLINE_SAMPLES as f32 * TAU;
            (
                (node.ndc.x + angle.cos() * rx) as f64,
                (node.ndc.y + angle.sin() * radius) as f64,
            )
        })
        .collect();
    ctx.draw(&Points {
        coords: &outline,
        color,
    });

    ctx.draw(&CanvasLine {
        x1: node.ndc.x as f64,
        y1: node.ndc.y as f64,
        x2: (node.ndc.x + node.spin.cos() * rx) as f64,
        y2: (node.ndc.y + node.spin.sin() * radius) as f64,
        color,
    });
}

fn draw_glyph(ctx: &mut Context, node: &NodeSprite, aspect: f32, labels_enabled: bool) {
    let mut style = Style::default().fg(emphasis_color(node.color, node.emphasis));
    if node.selected {
        style = style
            .fg(to_color(node.color))
            .bg(to_color(MAP_SHADOW))
            .add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    ctx.print(
        node.ndc.x as f64,
        node.ndc.y as f64,
        Span::styled(category_glyph(node.category), style),
    );

    if labels_enabled {
        let offset = node.radius.max(MIN_OUTLINE_RADIUS) / aspect + 0.02;
        let label_style = if node.selected {
            Style::default()
                .fg(to_color(node.color))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(BONE_WHITE)
        };
        ctx.print(
            (node.ndc.x + offset) as f64,
            node.ndc.y as f64,
            Span::styled(format!("{} {}", node.label, node.ip), label_style),
        );
    }
}

pub fn category_glyph(category: NodeCategory) -> &'static str {
    match category {
        NodeCategory::Router => "◆",
        NodeCategory::Server => "■",
        NodeCategory::Workstation => "●",
        NodeCategory::Firewall => "▲",
        NodeCategory::Ids => "◉",
    }
}
