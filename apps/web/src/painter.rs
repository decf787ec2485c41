//! Canvas painting for the browser build. Mirrors the terminal painter, but
//! against the ratatui bundled with ratzilla.

use dashboard_core::backend::{Axis, AxisOrient, HoverEffect, Legend};
use dashboard_core::{Mark, Point, Rgb, Surface};
use ratzilla::ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Paragraph,
    },
    Frame,
};

pub const fn web_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn dimmed(rgb: Rgb, opacity: f64) -> Rgb {
    let channel = |value: u8| (f64::from(value) * opacity.clamp(0.0, 1.0)).round() as u8;
    Rgb(channel(rgb.0), channel(rgb.1), channel(rgb.2))
}

pub fn render_surface(f: &mut Frame<'_>, area: Rect, surface: &Surface, hovered: Option<usize>) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    // one fill point per braille dot
    let step = (surface.width / (f64::from(area.width) * 2.0))
        .min(surface.height / (f64::from(area.height) * 4.0));
    let label_budget = usize::from(area.width / 6).max(2);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, surface.width])
        .y_bounds([0.0, surface.height])
        .paint(|ctx| {
            for (index, mark) in surface.marks.iter().enumerate() {
                let effect = mark
                    .hover
                    .as_ref()
                    .filter(|_| hovered == Some(index))
                    .map(|hover| hover.effect);
                paint_mark(ctx, surface.height, mark, effect, step);
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
    effect: Option<HoverEffect>,
    step: f64,
) {
    let flip = |point: &Point| (point.x, height - point.y);
    let shape = match effect {
        Some(HoverEffect::Enlarge { factor }) => mark.shape.enlarged(factor),
        _ => mark.shape.clone(),
    };

    if let Some(fill) = mark.style.fill {
        let opacity = match effect {
            Some(HoverEffect::Fade { opacity }) => opacity,
            _ => mark.style.opacity,
        };
        let coords: Vec<(f64, f64)> = shape.fill_points(step).iter().map(flip).collect();
        ctx.draw(&Points {
            coords: &coords,
            color: web_color(dimmed(fill, opacity)),
        });
    }

    let stroke = match effect {
        Some(HoverEffect::Outline { stroke, .. }) => Some(stroke),
        _ => mark.style.stroke.filter(|_| mark.style.stroke_width > 0.0),
    };
    let Some(stroke) = stroke else {
        return;
    };
    for line in shape.outline() {
        for pair in line.windows(2) {
            let (x1, y1) = flip(&pair[0]);
            let (x2, y2) = flip(&pair[1]);
            ctx.draw(&CanvasLine {
                x1,
                y1,
                x2,
                y2,
                color: web_color(stroke),
            });
        }
    }
}

fn paint_axis(ctx: &mut Context<'_>, height: f64, axis: &Axis, label_budget: usize) {
    let every = axis.ticks.len().div_ceil(label_budget).max(1);
    let (x1, y1, x2, y2) = match axis.orient {
        AxisOrient::Bottom => (
            axis.range.0,
            height - axis.offset,
            axis.range.1,
            height - axis.offset,
        ),
        AxisOrient::Left => (
            axis.offset,
            height - axis.range.0,
            axis.offset,
            height - axis.range.1,
        ),
    };
    ctx.draw(&CanvasLine {
        x1,
        y1,
        x2,
        y2,
        color: Color::Gray,
    });
    for tick in axis.ticks.iter().step_by(every) {
        match axis.orient {
            AxisOrient::Bottom => ctx.print(tick.position, 0.0, tick.label.clone()),
            AxisOrient::Left => ctx.print(0.0, height - tick.position, tick.label.clone()),
        }
    }
}

pub fn legend_width(legend: &Legend) -> u16 {
    let widest = legend
        .entries
        .iter()
        .map(|entry| entry.label.chars().count())
        .chain(std::iter::once(legend.title.chars().count()))
        .max()
        .unwrap_or(0);
    u16::try_from(widest + 3).unwrap_or(u16::MAX).min(26)
}

pub fn render_legend(f: &mut Frame<'_>, area: Rect, legend: &Legend) {
    let mut lines = vec![TextLine::from(Span::styled(
        legend.title.as_str(),
        Style::default().fg(Color::Gray),
    ))];
    lines.extend(legend.entries.iter().map(|entry| {
        TextLine::from(vec![
            Span::styled("■ ", Style::default().fg(web_color(entry.color))),
            Span::raw(entry.label.as_str()),
        ])
    }));
    f.render_widget(Paragraph::new(lines), area);
}
