use std::f64::consts::TAU;

use crate::backend::{
    ChartBackend, HoverEffect, Legend, LegendEntry, Mark, Point, Rgb, Shape, Style, SurfaceId,
};
use crate::model::Record;
use crate::scale::{OrdinalScale, CATEGORY10};

use super::{Frame, RangeBins, Renderer, NO_MARGIN};

#[derive(Debug, Clone, PartialEq)]
pub enum PieGrouping {
    /// One slice per distinct record label, weighted by the summed values.
    ByLabel,
    /// One slice per numeric range, weighted by the number of records.
    ByRange(RangeBins),
}

/// A non-empty group of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub weight: f64,
}

/// Groups `records`; groups without records are left out.
pub fn slices<R: Record>(grouping: &PieGrouping, records: &[&R]) -> Vec<Slice> {
    match grouping {
        PieGrouping::ByLabel => {
            let mut slices: Vec<Slice> = Vec::new();
            for record in records {
                match slices.iter_mut().find(|slice| slice.label == record.label()) {
                    Some(slice) => {
                        slice.count += 1;
                        slice.weight += record.value();
                    }
                    None => slices.push(Slice {
                        label: record.label().to_string(),
                        count: 1,
                        weight: record.value(),
                    }),
                }
            }
            slices
        }
        PieGrouping::ByRange(bins) => bins
            .counts(records)
            .into_iter()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .map(|(index, count)| Slice {
                label: bins.label(index),
                count,
                weight: count as f64,
            })
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct PieChart {
    container: String,
    title: String,
    grouping: PieGrouping,
    frame: Frame,
}

impl PieChart {
    pub fn new(
        container: impl Into<String>,
        title: impl Into<String>,
        grouping: PieGrouping,
    ) -> Self {
        Self {
            container: container.into(),
            title: title.into(),
            grouping,
            frame: Frame::new(300.0, 300.0, NO_MARGIN),
        }
    }
}

impl<R: Record> Renderer<R> for PieChart {
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
        let groups = slices(&self.grouping, records);

        let mut colors = OrdinalScale::new(&CATEGORY10);
        let palette: Vec<Rgb> = groups.iter().map(|slice| colors.color(&slice.label)).collect();
        let mut ordered: Vec<(Slice, Rgb)> = groups.into_iter().zip(palette).collect();

        // largest slice first, clockwise from twelve o'clock
        ordered.retain(|(slice, _)| slice.weight.is_finite() && slice.weight > 0.0);
        ordered.sort_by(|a, b| b.0.weight.total_cmp(&a.0.weight));

        let total: f64 = ordered.iter().map(|(slice, _)| slice.weight).sum();
        if total <= 0.0 {
            return;
        }

        let center = Point::new(self.frame.width / 2.0, self.frame.height / 2.0);
        let radius = self.frame.width.min(self.frame.height) / 2.0;

        let mut angle = 0.0;
        for (slice, color) in &ordered {
            let sweep = slice.weight / total * TAU;
            let percent = slice.weight / total * 100.0;
            let mark = Mark::new(
                Shape::Arc {
                    center,
                    inner_radius: 0.0,
                    outer_radius: radius,
                    start_angle: angle,
                    end_angle: angle + sweep,
                },
                Style::fill(*color).with_stroke(Rgb::WHITE, 1.0),
            )
            .on_hover(
                format!("{}: {} ({percent:.1}%)", slice.label, slice.count),
                HoverEffect::Enlarge { factor: 1.08 },
            );
            backend.draw(surface, mark);
            angle += sweep;
        }

        backend.legend(
            surface,
            Legend {
                title: self.title.clone(),
                entries: ordered
                    .iter()
                    .map(|(slice, color)| LegendEntry {
                        color: *color,
                        label: slice.label.clone(),
                    })
                    .collect(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EducationRecord, SalesRecord};
    use crate::render::testing::Recorder;
    use proptest::prelude::*;

    fn county(fips: u32, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            state: "AL".to_string(),
            area_name: format!("County {fips}"),
            bachelors_or_higher: value,
        }
    }

    fn sale(name: &str, value: f64) -> SalesRecord {
        SalesRecord {
            name: name.to_string(),
            category: "Fruit".to_string(),
            value,
            date: "2024-01-01".to_string(),
        }
    }

    fn education_ranges() -> PieGrouping {
        PieGrouping::ByRange(RangeBins::new(vec![0.0, 15.0, 25.0, 35.0, 50.0, 100.0]))
    }

    #[test]
    fn label_grouping_sums_values() {
        let records = [sale("Apples", 10.0), sale("Pears", 5.0), sale("Apples", 2.0)];
        let refs: Vec<&SalesRecord> = records.iter().collect();
        let groups = slices(&PieGrouping::ByLabel, &refs);
        assert_eq!(
            groups[0],
            Slice {
                label: "Apples".to_string(),
                count: 2,
                weight: 12.0
            }
        );
        assert_eq!(groups[1].count, 1);
    }

    #[test]
    fn arcs_cover_the_full_circle() {
        let records = [county(1, 5.0), county(2, 20.0), county(3, 22.0), county(4, 60.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let mut backend = Recorder::default();

        PieChart::new("#pie", "Attainment", education_ranges()).render(&refs, &mut backend);

        let arcs: Vec<(f64, f64)> = backend
            .marks()
            .iter()
            .filter_map(|mark| match mark.shape {
                Shape::Arc {
                    start_angle,
                    end_angle,
                    ..
                } => Some((start_angle, end_angle)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 3);
        assert!(arcs[0].0.abs() < 1e-9);
        assert!((arcs[2].1 - TAU).abs() < 1e-9);

        let first_label = backend.marks()[0].hover.as_ref().map(|h| h.label.clone());
        assert_eq!(first_label.as_deref(), Some("15-25: 2 (50.0%)"));
        assert_eq!(backend.legend().map(|legend| legend.entries.len()), Some(3));
    }

    #[test]
    fn empty_input_draws_nothing() {
        let mut backend = Recorder::default();
        PieChart::new("#pie", "Attainment", education_ranges())
            .render(&Vec::<&EducationRecord>::new(), &mut backend);
        assert!(backend.marks().is_empty());
    }

    proptest! {
        #[test]
        fn range_slices_account_for_every_record(values in prop::collection::vec(-10.0_f64..120.0, 0..64)) {
            let records: Vec<EducationRecord> = values
                .iter()
                .enumerate()
                .map(|(index, value)| county(index as u32, *value))
                .collect();
            let refs: Vec<&EducationRecord> = records.iter().collect();

            let groups = slices(&education_ranges(), &refs);
            prop_assert_eq!(groups.iter().map(|slice| slice.count).sum::<usize>(), records.len());
            prop_assert!(groups.iter().all(|slice| slice.count > 0));
        }
    }
}
