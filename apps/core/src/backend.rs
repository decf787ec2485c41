//! Drawing primitives and the backend the renderers draw through.
//!
//! Coordinates are surface-local, origin top-left, y growing downwards.
//! Arc angles are radians measured clockwise from twelve o'clock.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Open polyline.
    Path { points: Vec<Point> },
    /// Filled area made of one or more closed rings (even-odd rule).
    Polygon { rings: Vec<Vec<Point>> },
    Arc {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Style {
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Style {
    pub const fn fill(color: Rgb) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    pub const fn stroke(color: Rgb, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub const fn with_stroke(mut self, color: Rgb, width: f64) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }
}

/// What happens to a mark while it is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverEffect {
    Fade { opacity: f64 },
    Enlarge { factor: f64 },
    Outline { stroke: Rgb, width: f64 },
}

/// A hover handler attached to one mark. It lives exactly as long as the mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hover {
    pub label: String,
    pub effect: HoverEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    pub shape: Shape,
    pub style: Style,
    pub hover: Option<Hover>,
}

impl Mark {
    pub const fn new(shape: Shape, style: Style) -> Self {
        Self {
            shape,
            style,
            hover: None,
        }
    }

    #[must_use]
    pub fn on_hover(mut self, label: impl Into<String>, effect: HoverEffect) -> Self {
        self.hover = Some(Hover {
            label: label.into(),
            effect,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// An axis line at `offset` (y for bottom axes, x for left axes) spanning
/// `range` along its direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub orient: AxisOrient,
    pub offset: f64,
    pub range: (f64, f64),
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Rgb,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SurfaceId(pub u64);

/// The drawing library seen by the chart renderers.
///
/// A container is a named slot on the page; a surface is one drawing area
/// appended to a container. Clearing a container drops its surfaces together
/// with every hover handler attached to their marks.
pub trait ChartBackend {
    fn clear(&mut self, container: &str);
    fn add_surface(&mut self, container: &str, width: f64, height: f64) -> SurfaceId;
    fn draw(&mut self, surface: SurfaceId, mark: Mark);
    fn axis(&mut self, surface: SurfaceId, axis: Axis);
    fn legend(&mut self, surface: SurfaceId, legend: Legend);
    fn set_text(&mut self, node: &str, text: String);
}
