// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts and toggle indicators.

use crate::app::AppState;
use crate::theme::{BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE, TOXIC_GREEN};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    // Calculate available width for hints (subtract borders and icon)
    let available_width = area.width.saturating_sub(4);

    // Define all hints with priority levels
    struct Hint {
        priority: u8,
        key: &'static str,
        desc: &'static str,
        color: Color,
    }

    let hints = [
        Hint {
            priority: 1,
            key: "Q:",
            desc: "Quit ",
            color: Color::Red,
        },
        Hint {
            priority: 1,
            key: "↑↓:",
            desc: "Nodes | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 1,
            key: "←→:",
            desc: "Orbit | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "Z/X:",
            desc: "Zoom | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "C:",
            desc: "Reset | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "G:",
            desc: "Swap net | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 3,
            key: "+/-:",
            desc: "FPS | ",
            color: NEON_PURPLE,
        },
    ];

    // Build status text, adding hints until we run out of space
    let mut spans = vec![Span::styled(" 🛡 ", Style::default().fg(NEON_PURPLE))];

    let mut current_length = 4;

    // Process hints by priority
    for priority in 1..=3 {
        for hint in hints.iter().filter(|hint| hint.priority == priority) {
            let hint_length = hint.key.chars().count() + hint.desc.len();
            if current_length + hint_length <= available_width as usize {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(hint.color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
                current_length += hint_length;
            }
        }
    }

    // Toggle indicators are always shown
    spans.push(Span::raw(" "));
    spans.extend(build_toggle_indicators(app));

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

fn toggle(spans: &mut Vec<Span<'static>>, key: &'static str, enabled: bool) {
    let (state, color) = if enabled {
        ("ON", TOXIC_GREEN)
    } else {
        ("OFF", BONE_WHITE)
    };
    spans.push(Span::styled(format!("[{}:", key), Style::default().fg(BONE_WHITE)));
    spans.push(Span::styled(
        state,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("] ", Style::default().fg(BONE_WHITE)));
}

/// Build toggle status indicator spans for the status bar
///
/// Shows [A:ON/OFF] [t:ON/OFF], the active network, and a marker while
/// slow frames have reduced animation.
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    toggle(&mut spans, "A", app.display.animations_enabled);
    toggle(&mut spans, "t", app.display.labels_enabled);

    spans.push(Span::styled("[net:", Style::default().fg(BONE_WHITE)));
    spans.push(Span::styled(
        app.network.name(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("] ", Style::default().fg(BONE_WHITE)));

    if app.viewport.is_animation_reduced() {
        spans.push(Span::styled(
            "[reduced]",
            Style::default()
                .fg(PUMPKIN_ORANGE)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans
}
