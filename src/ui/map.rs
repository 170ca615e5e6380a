// Map rendering
//
// Paints the terminal surface's retained scene on a braille canvas: the
// Mercator graticule as backdrop, every route's revealed prefix, endpoint and
// travelling markers, then the tooltip overlay on top.
//
// Surface y grows downward while canvas y grows upward, so every y is
// flipped against the surface height.

use arcmap::geo::project_lat_lon;
use arcmap::surface::terminal::TerminalSurface;
use arcmap::surface::MarkerKind;
use arcmap::SurfaceSize;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::config::{GRATICULE_LAT_LIMIT, GRATICULE_STEP_DEG, PATH_SEGMENTS};
use crate::app::AppState;
use crate::theme::{
    interpolate_color, parse_color, rgb_of, AMBER, CHALK, DEEP_SEA, SIGNAL_ORANGE, TRAIL_WHITE,
};

/// Symbol printed for travelling markers
const TRAVELLER_SYMBOL: &str = "●";

fn canvas_block() -> Block<'static> {
    Block::default()
        .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(SIGNAL_ORANGE))
}

/// Drawable cells inside the canvas border
pub fn canvas_inner(area: Rect) -> Rect {
    canvas_block().inner(area)
}

/// Meridian and parallel segments in surface coordinates
///
/// Meridians run between +-GRATICULE_LAT_LIMIT; parallels span the full width.
pub fn graticule(size: SurfaceSize) -> Vec<((f64, f64), (f64, f64))> {
    let mut lines = Vec::new();
    let steps = (360.0 / GRATICULE_STEP_DEG) as i32;

    for i in 0..=steps {
        let lon = -180.0 + i as f64 * GRATICULE_STEP_DEG;
        let top = project_lat_lon(GRATICULE_LAT_LIMIT, lon, size.width, size.height);
        let bottom = project_lat_lon(-GRATICULE_LAT_LIMIT, lon, size.width, size.height);
        lines.push(((top.x, top.y), (bottom.x, bottom.y)));
    }

    let mut lat = -GRATICULE_STEP_DEG * (GRATICULE_LAT_LIMIT / GRATICULE_STEP_DEG).floor();
    while lat <= GRATICULE_LAT_LIMIT {
        let p = project_lat_lon(lat, 0.0, size.width, size.height);
        lines.push(((0.0, p.y), (size.width, p.y)));
        lat += GRATICULE_STEP_DEG;
    }

    lines
}

pub fn render_map(f: &mut Frame, summary_area: Rect, area: Rect, app: &AppState) {
    let surface = app.map.surface();
    let model = app.map.model();

    // Summary line
    let pinned = app
        .map
        .pinned()
        .map(|idx| model.accessible_label(idx))
        .unwrap_or_else(|| "none".to_string());
    let summary = Paragraph::new(Line::from(vec![
        Span::styled(" ◆ ", Style::default().fg(SIGNAL_ORANGE)),
        Span::styled(
            format!(
                "Routes: {} | Points: {} | Pinned: {}",
                model.len(),
                model.points().len(),
                pinned
            ),
            Style::default().fg(CHALK),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(SIGNAL_ORANGE))
            .title(vec![Span::styled(
                "━ arcmap (Web Mercator) ━",
                Style::default()
                    .fg(SIGNAL_ORANGE)
                    .add_modifier(Modifier::BOLD),
            )]),
    );
    f.render_widget(summary, summary_area);

    let size = surface.size();
    let height = size.height;
    let backdrop = graticule(size);
    let is_empty = model.is_empty();

    let canvas = Canvas::default()
        .block(canvas_block())
        .marker(Marker::Braille)
        .x_bounds([0.0, size.width])
        .y_bounds([0.0, size.height])
        .paint(move |ctx| {
            for &((x1, y1), (x2, y2)) in &backdrop {
                ctx.draw(&CanvasLine {
                    x1,
                    y1: height - y1,
                    x2,
                    y2: height - y2,
                    color: DEEP_SEA,
                });
            }
            ctx.layer();

            draw_routes(ctx, surface, height);
            ctx.layer();

            draw_markers(ctx, surface, height);

            if is_empty {
                ctx.print(
                    size.width / 2.0 - 12.0,
                    height / 2.0,
                    Span::styled(
                        "No routes to draw",
                        Style::default().fg(CHALK).add_modifier(Modifier::ITALIC),
                    ),
                );
            }
        });
    f.render_widget(canvas, area);

    render_tooltip(f, surface, app.pulse_phase);
}

fn draw_routes(ctx: &mut Context<'_>, surface: &TerminalSurface, height: f64) {
    for path in surface.paths() {
        let color = parse_color(&path.style.stroke, SIGNAL_ORANGE);
        let points = path.visible_points(PATH_SEGMENTS);
        for w in points.windows(2) {
            ctx.draw(&CanvasLine {
                x1: w[0].x,
                y1: height - w[0].y,
                x2: w[1].x,
                y2: height - w[1].y,
                color,
            });
            // One extra dot row thickens highlighted routes
            if path.style.highlighted {
                ctx.draw(&CanvasLine {
                    x1: w[0].x,
                    y1: height - w[0].y + 1.0,
                    x2: w[1].x,
                    y2: height - w[1].y + 1.0,
                    color,
                });
            }
        }
    }
}

fn draw_markers(ctx: &mut Context<'_>, surface: &TerminalSurface, height: f64) {
    for marker in surface.markers() {
        if !marker.center.is_finite() {
            continue;
        }
        match marker.style.kind {
            MarkerKind::Point => ctx.draw(&Circle {
                x: marker.center.x,
                y: height - marker.center.y,
                radius: marker.style.radius / 2.0,
                color: parse_color(&marker.style.fill, SIGNAL_ORANGE),
            }),
            MarkerKind::Travelling => ctx.print(
                marker.center.x,
                height - marker.center.y,
                Span::styled(
                    TRAVELLER_SYMBOL,
                    Style::default().fg(parse_color(&marker.style.fill, TRAIL_WHITE)),
                ),
            ),
        }
    }
}

fn render_tooltip(f: &mut Frame, surface: &TerminalSurface, pulse_phase: f32) {
    let (Some(tip), Some(rect)) = (surface.tooltip(), surface.tooltip_rect()) else {
        return;
    };

    let border = if tip.pinned {
        match (rgb_of(SIGNAL_ORANGE), rgb_of(AMBER)) {
            (Some(from), Some(to)) => interpolate_color(from, to, pulse_phase),
            _ => SIGNAL_ORANGE,
        }
    } else {
        CHALK
    };

    let lines: Vec<Line> = tip
        .lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let style = if i == 0 {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(CHALK)
            };
            Line::from(Span::styled(format!(" {}", text), style))
        })
        .collect();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    if tip.pinned {
        block = block.title(Span::styled(" pinned ", Style::default().fg(border)));
    }

    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(block), rect);
}
