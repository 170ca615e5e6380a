// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts and toggle indicators.

use crate::app::AppState;
use crate::theme::{AMBER, CHALK, SEA_GREEN, SIGNAL_ORANGE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// One key hint; lower priority numbers are kept first when space runs out
struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
    color: Color,
}

const HINTS: [Hint; 8] = [
    Hint {
        priority: 1,
        key: "Q:",
        desc: "Quit ",
        color: Color::Red,
    },
    Hint {
        priority: 1,
        key: "Tab:",
        desc: "Focus | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 1,
        key: "Enter:",
        desc: "Pin | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 1,
        key: "Esc:",
        desc: "Unpin | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 2,
        key: "+/-:",
        desc: "Curve | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 2,
        key: "A:",
        desc: "Draw | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 2,
        key: "M:",
        desc: "Markers | ",
        color: SIGNAL_ORANGE,
    },
    Hint {
        priority: 3,
        key: "F:",
        desc: "Follow | R: Replay | ",
        color: SIGNAL_ORANGE,
    },
];

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    // Available width for hints (subtract borders and icon)
    let available_width = area.width.saturating_sub(4) as usize;

    let mut spans = vec![Span::styled(" ◆ ", Style::default().fg(SIGNAL_ORANGE))];
    let mut current_length = 4;

    for priority in 1..=3 {
        for hint in HINTS.iter().filter(|h| h.priority == priority) {
            let hint_length = hint.key.len() + hint.desc.len();
            if current_length + hint_length <= available_width {
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
                .border_style(Style::default().fg(SIGNAL_ORANGE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

fn on_off(label: &'static str, enabled: bool) -> [Span<'static>; 3] {
    let (state, color) = if enabled {
        ("ON", SEA_GREEN)
    } else {
        ("OFF", CHALK)
    };
    [
        Span::styled(label, Style::default().fg(CHALK)),
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("] ", Style::default().fg(CHALK)),
    ]
}

/// Build toggle status indicator spans for the status bar
///
/// Shows [A:ON/OFF] [M:ON/OFF] [F:cursor/midpoint] [C:curvature]. The
/// curvature value is drawn in amber right after it changes.
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    spans.extend(on_off("[A:", app.settings.draw_animation));
    spans.extend(on_off("[M:", app.settings.show_markers));

    spans.push(Span::styled("[F:", Style::default().fg(CHALK)));
    spans.push(Span::styled(
        app.settings.follow.as_str(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("] ", Style::default().fg(CHALK)));

    let curve_color = if app.curvature_recently_changed() {
        AMBER
    } else {
        SEA_GREEN
    };
    spans.push(Span::styled("[C:", Style::default().fg(CHALK)));
    spans.push(Span::styled(
        format!("{:+.2}", app.settings.curvature),
        Style::default().fg(curve_color).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("]", Style::default().fg(CHALK)));

    spans
}
