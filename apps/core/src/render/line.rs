use chrono::NaiveDate;

use crate::backend::{ChartBackend, Mark, Point, Shape, Style, SurfaceId, Tick};
use crate::model::Dated;
use crate::scale::{self, LinearScale, TimeScale};

use super::bar::BAR_FILL;
use super::{format_value, Frame, Renderer, CHART_MARGIN};

/// A single connected path of values ordered by date.
#[derive(Debug, Clone)]
pub struct LineChart {
    container: String,
    title: String,
    frame: Frame,
}

impl LineChart {
    pub fn new(container: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            title: title.into(),
            frame: Frame::new(400.0, 300.0, CHART_MARGIN),
        }
    }
}

impl<R: Dated> Renderer<R> for LineChart {
    fn container(&self) -> &str {
        &self.container
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn paint(&self, records: &[&R], surface: SurfaceId, backend: &mut dyn ChartBackend) {
        let frame = self.frame;
        let mut series: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter_map(|record| Some((record.date()?, record.value())))
            .collect();
        series.sort_by_key(|(date, _)| *date);

        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return;
        };

        let x = TimeScale::new((first.0, last.0), (0.0, frame.inner_width()));
        let top = scale::max(series.iter().map(|(_, value)| *value)).unwrap_or(0.0);
        let y = LinearScale::new((0.0, top), (frame.inner_height(), 0.0));

        let points = series
            .iter()
            .map(|(date, value)| {
                Point::new(
                    frame.margin.left + x.apply(*date),
                    frame.margin.top + y.apply(*value),
                )
            })
            .collect();
        backend.draw(
            surface,
            Mark::new(Shape::Path { points }, Style::stroke(BAR_FILL, 2.0)),
        );

        let x_ticks = x
            .ticks(5)
            .into_iter()
            .map(|date| Tick {
                position: frame.margin.left + x.apply(date),
                label: date.format("%b %d").to_string(),
            })
            .collect();
        backend.axis(surface, frame.bottom_axis(x_ticks));

        let y_ticks = y
            .ticks(10)
            .into_iter()
            .map(|value| Tick {
                position: frame.margin.top + y.apply(value),
                label: format_value(value),
            })
            .collect();
        backend.axis(surface, frame.left_axis(y_ticks));
    }
}
