//! Paints scene surfaces onto a ratatui canvas.
//!
//! Scene coordinates grow downwards, canvas coordinates upwards, so every y
//! is flipped against the surface height.

use dashboard_core::backend::{Axis, AxisOrient, HoverEffect, Legend};
use dashboard_core::{Mark, Point, Rgb, Surface};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Braille dots per terminal cell.
const DOTS_X: f64 = 2.0;
const DOTS_Y: f64 = 4.0;

pub const fn terminal_color(color: Rgb) -> Color {
    // pure black vanishes on dark terminals
    if color.0 == 0 && color.1 == 0 && color.2 == 0 {
        Color::White
    } else {
        Color::Rgb(color.0, color.1, color.2)
    }
}

fn faded(color: Rgb, opacity: f64) -> Rgb {
    let scale = |channel: u8| (f64::from(channel) * opacity.clamp(0.0, 1.0)).round() as u8;
    Rgb(scale(color.0), scale(color.1), scale(color.2))
}

/// Sampling step that gives roughly one fill point per braille dot.
fn fill_step(surface: &Surface, area: Rect) -> f64 {
    let columns = f64::from(area.width.max(1)) * DOTS_X;
    let rows = f64::from(area.height.max(1)) * DOTS_Y;
    (surface.width / columns).min(surface.height / rows)
}

pub fn render_surface(f: &mut Frame<'_>, area: Rect, surface: &Surface, hovered: Option<usize>) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let step = fill_step(surface, area);
    let label_budget = usize::from(area.width / 6).max(2);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, surface.width])
        .y_bounds([0.0, surface.height])
        .paint(|ctx| {
            for (index, mark) in surface.marks.iter().enumerate() {
                let hover = (hovered == Some(index))
                    .then(|| mark.hover.as_ref().map(|hover| hover.effect))
                    .flatten();
                paint_mark(ctx, surface.height, mark, hover, step);
            }
            ctx.layer();
            for axis in &surface.axes {
                paint_axis(ctx, surface.height, axis, label_budget);
            }
        });
    f.render_widget(canvas, area);
}

fn paint_mark(
    ctx: &mut Context<'_>,
    height: f64,
    mark: &Mark,
    hover: Option<HoverEffect>,
    step: f64,
) {
    let flip = |point: &Point| (point.x, height - point.y);

    let shape = match hover {
        Some(HoverEffect::Enlarge { factor }) => mark.shape.enlarged(factor),
        _ => mark.shape.clone(),
    };

    if let Some(fill) = mark.style.fill {
        let fill = match hover {
            Some(HoverEffect::Fade { opacity }) => faded(fill, opacity),
            _ => faded(fill, mark.style.opacity),
        };
        let coords: Vec<(f64, f64)> = shape.fill_points(step).iter().map(flip).collect();
        ctx.draw(&Points {
            coords: &coords,
            color: terminal_color(fill),
        });
    }

    let stroke = match hover {
        Some(HoverEffect::Outline { stroke, .. }) => Some(stroke),
        _ => mark.style.stroke.filter(|_| mark.style.stroke_width > 0.0),
    };
    if let Some(stroke) = stroke {
        let color = terminal_color(stroke);
        for line in shape.outline() {
            for pair in line.windows(2) {
                let (x1, y1) = flip(&pair[0]);
                let (x2, y2) = flip(&pair[1]);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                });
            }
        }
    }
}

fn paint_axis(ctx: &mut Context<'_>, height: f64, axis: &Axis, label_budget: usize) {
    let color = Color::Gray;
    let every = axis.ticks.len().div_ceil(label_budget).max(1);
    match axis.orient {
        AxisOrient::Bottom => {
            let y = height - axis.offset;
            ctx.draw(&CanvasLine {
                x1: axis.range.0,
                y1: y,
                x2: axis.range.1,
                y2: y,
                color,
            });
            for tick in axis.ticks.iter().step_by(every) {
                ctx.print(tick.position, 0.0, tick.label.clone());
            }
        }
        AxisOrient::Left => {
            let x = axis.offset;
            ctx.draw(&CanvasLine {
                x1: x,
                y1: height - axis.range.0,
                x2: x,
                y2: height - axis.range.1,
                color,
            });
            for tick in axis.ticks.iter().step_by(every) {
                ctx.print(0.0, height - tick.position, tick.label.clone());
            }
        }
    }
}

pub fn legend_width(legend: &Legend) -> u16 {
    let widest = legend
        .entries
        .iter()
        .map(|entry| entry.label.chars().count())
        .max()
        .unwrap_or(0);
    u16::try_from(widest + 3).unwrap_or(u16::MAX).min(24)
}

pub fn render_legend(f: &mut Frame<'_>, area: Rect, legend: &Legend) {
    let lines: Vec<TextLine<'_>> = legend
        .entries
        .iter()
        .map(|entry| {
            TextLine::from(vec![
                Span::styled("■ ", Style::default().fg(terminal_color(entry.color))),
                Span::raw(entry.label.as_str()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_lifted_for_dark_terminals() {
        assert_eq!(terminal_color(Rgb::BLACK), Color::White);
        assert_eq!(terminal_color(Rgb(0x4c, 0xaf, 0x50)), Color::Rgb(0x4c, 0xaf, 0x50));
    }

    #[test]
    fn fading_scales_channels() {
        assert_eq!(faded(Rgb(200, 100, 0), 0.5), Rgb(100, 50, 0));
        assert_eq!(faded(Rgb(10, 10, 10), 2.0), Rgb(10, 10, 10));
    }

    #[test]
    fn fill_step_matches_braille_resolution() {
        let surface = Surface {
            id: dashboard_core::backend::SurfaceId(0),
            width: 400.0,
            height: 300.0,
            marks: Vec::new(),
            axes: Vec::new(),
            legend: None,
        };
        let step = fill_step(&surface, Rect::new(0, 0, 100, 30));
        assert!((step - 2.0).abs() < 1e-9);
    }
}
