//! Chart renderers.
//!
//! Each renderer owns one container. `render` clears that container, appends
//! a single surface and paints the records into it, so repeated renders never
//! accumulate output.

pub mod bar;
pub mod choropleth;
pub mod line;
pub mod pie;

pub use bar::{BarChart, BarLayout};
pub use choropleth::{ChoroplethMap, RegionMap, NO_DATA};
pub use line::LineChart;
pub use pie::{PieChart, PieGrouping, Slice};

use crate::backend::{Axis, AxisOrient, ChartBackend, SurfaceId, Tick};
use crate::model::Record;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const CHART_MARGIN: Margin = Margin {
    top: 20.0,
    right: 20.0,
    bottom: 30.0,
    left: 50.0,
};

pub const NO_MARGIN: Margin = Margin {
    top: 0.0,
    right: 0.0,
    bottom: 0.0,
    left: 0.0,
};

/// Surface size plus the margin reserved for axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Frame {
    pub const fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    fn bottom_axis(&self, ticks: Vec<Tick>) -> Axis {
        Axis {
            orient: AxisOrient::Bottom,
            offset: self.margin.top + self.inner_height(),
            range: (self.margin.left, self.margin.left + self.inner_width()),
            ticks,
        }
    }

    fn left_axis(&self, ticks: Vec<Tick>) -> Axis {
        Axis {
            orient: AxisOrient::Left,
            offset: self.margin.left,
            range: (self.margin.top, self.margin.top + self.inner_height()),
            ticks,
        }
    }
}

pub trait Renderer<R> {
    fn container(&self) -> &str;
    fn title(&self) -> &str;
    fn frame(&self) -> Frame;
    fn paint(&self, records: &[&R], surface: SurfaceId, backend: &mut dyn ChartBackend);

    /// Clears the container and draws `records` into a fresh surface.
    fn render(&self, records: &[&R], backend: &mut dyn ChartBackend) {
        backend.clear(self.container());
        let frame = self.frame();
        let surface = backend.add_surface(self.container(), frame.width, frame.height);
        tracing::debug!(
            container = self.container(),
            records = records.len(),
            "rendering chart"
        );
        self.paint(records, surface, backend);
    }
}

/// Contiguous numeric ranges defined by ascending edges.
///
/// Values below the first edge fall into the first range and values above the
/// last edge into the last one, so every finite value lands somewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBins {
    edges: Vec<f64>,
}

impl RangeBins {
    pub fn new(mut edges: Vec<f64>) -> Self {
        edges.retain(|edge| edge.is_finite());
        edges.sort_by(f64::total_cmp);
        edges.dedup();
        Self { edges }
    }

    /// `count` equal-width ranges over `[lo, hi]`.
    pub fn uniform(lo: f64, hi: f64, count: usize) -> Self {
        let count = count.max(1);
        Self::new(
            (0..=count)
                .map(|i| (hi - lo).mul_add(i as f64 / count as f64, lo))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || self.is_empty() {
            return None;
        }
        let inner = &self.edges[1..self.edges.len() - 1];
        Some(inner.partition_point(|edge| *edge <= value))
    }

    pub fn label(&self, index: usize) -> String {
        match (self.edges.get(index), self.edges.get(index + 1)) {
            (Some(lo), Some(hi)) => format!("{}-{}", format_value(*lo), format_value(*hi)),
            _ => String::new(),
        }
    }

    pub fn counts<R: Record>(&self, records: &[&R]) -> Vec<usize> {
        let mut counts = vec![0; self.len()];
        for record in records {
            if let Some(index) = self.index(record.value()) {
                counts[index] += 1;
            }
        }
        counts
    }
}

/// Whole numbers without decimals, everything else with one.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::backend::{Axis, ChartBackend, Legend, Mark, SurfaceId};

    /// Backend that records every call in order.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub calls: Vec<Call>,
        next: u64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Clear(String),
        Surface(String, SurfaceId),
        Draw(SurfaceId, Mark),
        Axis(SurfaceId, Axis),
        Legend(SurfaceId, Legend),
        Text(String, String),
    }

    impl Recorder {
        pub fn marks(&self) -> Vec<&Mark> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Draw(_, mark) => Some(mark),
                    _ => None,
                })
                .collect()
        }

        pub fn legend(&self) -> Option<&Legend> {
            self.calls.iter().find_map(|call| match call {
                Call::Legend(_, legend) => Some(legend),
                _ => None,
            })
        }

        pub fn axes(&self) -> Vec<&Axis> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Axis(_, axis) => Some(axis),
                    _ => None,
                })
                .collect()
        }
    }

    impl ChartBackend for Recorder {
        fn clear(&mut self, container: &str) {
            self.calls.push(Call::Clear(container.to_string()));
        }

        fn add_surface(&mut self, container: &str, _width: f64, _height: f64) -> SurfaceId {
            let id = SurfaceId(self.next);
            self.next += 1;
            self.calls.push(Call::Surface(container.to_string(), id));
            id
        }

        fn draw(&mut self, surface: SurfaceId, mark: Mark) {
            self.calls.push(Call::Draw(surface, mark));
        }

        fn axis(&mut self, surface: SurfaceId, axis: Axis) {
            self.calls.push(Call::Axis(surface, axis));
        }

        fn legend(&mut self, surface: SurfaceId, legend: Legend) {
            self.calls.push(Call::Legend(surface, legend));
        }

        fn set_text(&mut self, node: &str, text: String) {
            self.calls.push(Call::Text(node.to_string(), text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_clamp_out_of_range_values() {
        let bins = RangeBins::uniform(0.0, 100.0, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.index(-5.0), Some(0));
        assert_eq!(bins.index(0.0), Some(0));
        assert_eq!(bins.index(10.0), Some(1));
        assert_eq!(bins.index(100.0), Some(9));
        assert_eq!(bins.index(250.0), Some(9));
        assert_eq!(bins.index(f64::NAN), None);
        assert_eq!(bins.label(1), "10-20");
    }

    #[test]
    fn bins_sort_and_dedup_edges() {
        let bins = RangeBins::new(vec![50.0, 0.0, 15.0, 15.0, f64::NAN]);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.label(0), "0-15");
    }

    #[test]
    fn values_format_compactly() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(12.34), "12.3");
    }
}
