use crate::backend::{ChartBackend, HoverEffect, Mark, Rgb, Shape, Style, SurfaceId, Tick};
use crate::model::Record;
use crate::scale::{self, BandScale, LinearScale};

use super::{format_value, Frame, RangeBins, Renderer, CHART_MARGIN};

pub const BAR_FILL: Rgb = Rgb(0x4c, 0xaf, 0x50);

#[derive(Debug, Clone, PartialEq)]
pub enum BarLayout {
    /// One bar per record, labelled by the record name.
    PerRecord,
    /// One bar per range, sized by how many records fall into it.
    Binned(RangeBins),
}

#[derive(Debug, Clone)]
pub struct BarChart {
    container: String,
    title: String,
    layout: BarLayout,
    frame: Frame,
}

struct Bar {
    key: String,
    value: f64,
    hover: String,
}

impl BarChart {
    pub fn per_record(container: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            title: title.into(),
            layout: BarLayout::PerRecord,
            frame: Frame::new(400.0, 300.0, CHART_MARGIN),
        }
    }

    pub fn binned(container: impl Into<String>, title: impl Into<String>, bins: RangeBins) -> Self {
        Self {
            layout: BarLayout::Binned(bins),
            ..Self::per_record(container, title)
        }
    }

    fn bars<R: Record>(&self, records: &[&R]) -> Vec<Bar> {
        match &self.layout {
            BarLayout::PerRecord => records
                .iter()
                .map(|record| Bar {
                    key: record.label().to_string(),
                    value: record.value(),
                    hover: format!("{}: {}", record.label(), format_value(record.value())),
                })
                .collect(),
            BarLayout::Binned(bins) => bins
                .counts(records)
                .into_iter()
                .enumerate()
                .map(|(index, count)| {
                    let key = bins.label(index);
                    Bar {
                        hover: format!("{key}: {count}"),
                        key,
                        value: count as f64,
                    }
                })
                .collect(),
        }
    }
}

impl<R: Record> Renderer<R> for BarChart {
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
        let bars = self.bars(records);
        let inner_height = frame.inner_height();

        let x = BandScale::new(
            bars.iter().map(|bar| bar.key.clone()),
            (0.0, frame.inner_width()),
            0.1,
        );
        let top = scale::max(bars.iter().map(|bar| bar.value)).unwrap_or(0.0);
        let y = LinearScale::new((0.0, top), (inner_height, 0.0));

        for bar in bars {
            let Some(left) = x.position(&bar.key) else {
                continue;
            };
            let bar_top = y.apply(bar.value);
            let mark = Mark::new(
                Shape::Rect {
                    x: frame.margin.left + left,
                    y: frame.margin.top + bar_top,
                    width: x.bandwidth(),
                    height: inner_height - bar_top,
                },
                Style::fill(BAR_FILL),
            )
            .on_hover(bar.hover, HoverEffect::Fade { opacity: 0.7 });
            backend.draw(surface, mark);
        }

        let half_band = x.bandwidth() / 2.0;
        let x_ticks = x
            .domain()
            .iter()
            .filter_map(|key| {
                Some(Tick {
                    position: frame.margin.left + x.position(key)? + half_band,
                    label: key.clone(),
                })
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
