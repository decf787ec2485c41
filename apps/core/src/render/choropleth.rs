use std::collections::HashMap;
use std::sync::Arc;

use geojson::{FeatureCollection, Geometry, Value};

use crate::backend::{
    ChartBackend, HoverEffect, Legend, LegendEntry, Mark, Point, Rgb, Shape, Style, SurfaceId,
};
use crate::geometry;
use crate::model::Regional;
use crate::scale::{self, QuantizeScale, BLUES9};
use crate::topology::numeric_id;

use super::{format_value, Frame, Renderer, NO_MARGIN};

/// Fill for features without a matching record.
pub const NO_DATA: Rgb = Rgb(0xcc, 0xcc, 0xcc);

const BORDER: Rgb = Rgb::WHITE;

/// Region geometry decoded once at load time and shared read-only by every
/// render of the map.
#[derive(Debug, Clone)]
pub struct RegionMap {
    features: FeatureCollection,
    borders: Option<Geometry>,
    bounds: Option<(Point, Point)>,
}

impl RegionMap {
    pub fn new(features: FeatureCollection, borders: Option<Geometry>) -> Self {
        let bounds = geometry::bounds(
            features
                .features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .flat_map(rings)
                .flatten()
                .collect::<Vec<_>>()
                .iter(),
        );
        Self {
            features,
            borders,
            bounds,
        }
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn borders(&self) -> Option<&Geometry> {
        self.borders.as_ref()
    }

    pub fn len(&self) -> usize {
        self.features.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.features.is_empty()
    }
}

/// Planar fit of the map bounds into the surface, preserving aspect ratio.
#[derive(Debug, Clone, Copy)]
struct Projection {
    scale: f64,
    dx: f64,
    dy: f64,
}

impl Projection {
    fn fit(bounds: Option<(Point, Point)>, width: f64, height: f64) -> Self {
        let Some((min, max)) = bounds else {
            return Self {
                scale: 1.0,
                dx: 0.0,
                dy: 0.0,
            };
        };
        let span_x = max.x - min.x;
        let span_y = max.y - min.y;
        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (width / span_x).min(height / span_y),
            (true, false) => width / span_x,
            (false, true) => height / span_y,
            (false, false) => 1.0,
        };
        Self {
            scale,
            dx: span_x.mul_add(-scale, width) / 2.0 - min.x * scale,
            dy: span_y.mul_add(-scale, height) / 2.0 - min.y * scale,
        }
    }

    fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x.mul_add(self.scale, self.dx),
            point.y.mul_add(self.scale, self.dy),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChoroplethMap {
    container: String,
    title: String,
    map: Arc<RegionMap>,
    frame: Frame,
    unit: String,
}

impl ChoroplethMap {
    pub fn new(container: impl Into<String>, title: impl Into<String>, map: Arc<RegionMap>) -> Self {
        Self {
            container: container.into(),
            title: title.into(),
            map,
            frame: Frame::new(960.0, 600.0, NO_MARGIN),
            unit: "%".to_string(),
        }
    }
}

impl<R: Regional> Renderer<R> for ChoroplethMap {
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
        let by_region: HashMap<u32, &R> = records
            .iter()
            .map(|record| (record.region_id(), *record))
            .collect();
        let colors = scale::extent(records.iter().map(|record| record.value()))
            .map(|domain| QuantizeScale::new(domain, &BLUES9));
        let projection = Projection::fit(self.map.bounds, self.frame.width, self.frame.height);

        for feature in &self.map.features.features {
            let Some(geometry) = feature.geometry.as_ref() else {
                continue;
            };
            let projected: Vec<Vec<Point>> = rings(geometry)
                .into_iter()
                .map(|ring| ring.into_iter().map(|p| projection.apply(p)).collect())
                .collect();
            if projected.is_empty() {
                continue;
            }

            let id = numeric_id(feature);
            let matched = id.and_then(|id| by_region.get(&id));
            let (fill, label) = match matched {
                Some(record) => (
                    colors
                        .as_ref()
                        .and_then(|scale| scale.color(record.value()))
                        .unwrap_or(NO_DATA),
                    format!(
                        "{}, {}: {}{}",
                        record.label(),
                        record.filter_key(),
                        format_value(record.value()),
                        self.unit
                    ),
                ),
                None => (
                    NO_DATA,
                    id.map_or_else(|| "No data".to_string(), |id| format!("{id}: no data")),
                ),
            };

            let mark = Mark::new(Shape::Polygon { rings: projected }, Style::fill(fill))
                .on_hover(
                    label,
                    HoverEffect::Outline {
                        stroke: Rgb::BLACK,
                        width: 1.5,
                    },
                );
            backend.draw(surface, mark);
        }

        if let Some(borders) = self.map.borders.as_ref() {
            for line in lines(borders) {
                let points = line.into_iter().map(|p| projection.apply(p)).collect();
                backend.draw(
                    surface,
                    Mark::new(Shape::Path { points }, Style::stroke(BORDER, 1.0)),
                );
            }
        }

        if let Some(scale) = colors {
            let entries = scale
                .lower_bounds()
                .into_iter()
                .zip(scale.colors().iter())
                .map(|(lower, color)| LegendEntry {
                    color: *color,
                    label: format!("{}{}", format_value(lower), self.unit),
                })
                .collect();
            backend.legend(
                surface,
                Legend {
                    title: self.title.clone(),
                    entries,
                },
            );
        }
    }
}

fn to_point(position: &[f64]) -> Option<Point> {
    match position {
        [x, y, ..] => Some(Point::new(*x, *y)),
        _ => None,
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Vec<Point> {
    positions.iter().filter_map(|p| to_point(p)).collect()
}

/// Every polygon ring of a geometry, holes included.
fn rings(geometry: &Geometry) -> Vec<Vec<Point>> {
    match &geometry.value {
        Value::Polygon(polygon) => polygon.iter().map(|ring| to_ring(ring)).collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .map(|ring| to_ring(ring))
            .collect(),
        Value::GeometryCollection(children) => children.iter().flat_map(rings).collect(),
        _ => Vec::new(),
    }
}

fn lines(geometry: &Geometry) -> Vec<Vec<Point>> {
    match &geometry.value {
        Value::LineString(line) => vec![to_ring(line)],
        Value::MultiLineString(lines) => lines.iter().map(|line| to_ring(line)).collect(),
        Value::GeometryCollection(children) => children.iter().flat_map(lines).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EducationRecord;
    use crate::render::testing::Recorder;
    use geojson::{feature::Id, Feature};
    use proptest::prelude::*;

    fn square(id: u64, x: f64) -> Feature {
        let ring = vec![
            vec![x, 0.0],
            vec![x + 1.0, 0.0],
            vec![x + 1.0, 1.0],
            vec![x, 1.0],
            vec![x, 0.0],
        ];
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: Some(Id::Number(id.into())),
            properties: None,
            foreign_members: None,
        }
    }

    fn strip(count: u64) -> Arc<RegionMap> {
        let features = FeatureCollection {
            bbox: None,
            features: (0..count).map(|id| square(id, id as f64)).collect(),
            foreign_members: None,
        };
        let borders = Geometry::new(Value::MultiLineString(vec![vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ]]));
        Arc::new(RegionMap::new(features, Some(borders)))
    }

    fn county(fips: u32, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            state: "AL".to_string(),
            area_name: format!("County {fips}"),
            bachelors_or_higher: value,
        }
    }

    fn polygon_fills(backend: &Recorder) -> Vec<Option<Rgb>> {
        backend
            .marks()
            .iter()
            .filter(|mark| matches!(mark.shape, Shape::Polygon { .. }))
            .map(|mark| mark.style.fill)
            .collect()
    }

    #[test]
    fn unmatched_features_get_no_data_fill() {
        let records = [county(0, 10.0), county(2, 90.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let mut backend = Recorder::default();

        ChoroplethMap::new("#map", "Attainment", strip(3)).render(&refs, &mut backend);

        let fills = polygon_fills(&backend);
        assert_eq!(fills, vec![Some(BLUES9[0]), Some(NO_DATA), Some(BLUES9[8])]);

        let labels: Vec<String> = backend
            .marks()
            .iter()
            .filter_map(|mark| mark.hover.as_ref().map(|h| h.label.clone()))
            .collect();
        assert_eq!(labels[0], "County 0, AL: 10%");
        assert_eq!(labels[1], "1: no data");
    }

    #[test]
    fn borders_and_legend_are_drawn() {
        let records = [county(0, 10.0), county(1, 55.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let mut backend = Recorder::default();

        ChoroplethMap::new("#map", "Attainment", strip(2)).render(&refs, &mut backend);

        let paths = backend
            .marks()
            .iter()
            .filter(|mark| matches!(mark.shape, Shape::Path { .. }))
            .count();
        assert_eq!(paths, 1);

        let legend = backend.legend().cloned().unwrap_or_else(|| Legend {
            title: String::new(),
            entries: Vec::new(),
        });
        assert_eq!(legend.entries.len(), 9);
        assert_eq!(legend.entries[0].label, "10%");
        assert_eq!(legend.entries[1].label, "15%");
    }

    #[test]
    fn map_is_fitted_into_the_surface() {
        let mut backend = Recorder::default();
        let records = [county(0, 10.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        ChoroplethMap::new("#map", "Attainment", strip(4)).render(&refs, &mut backend);

        let bounds = geometry::bounds(
            backend
                .marks()
                .iter()
                .filter_map(|mark| match &mark.shape {
                    Shape::Polygon { rings } => Some(rings.iter().flatten()),
                    _ => None,
                })
                .flatten(),
        );
        let Some((min, max)) = bounds else {
            panic!("expected bounds");
        };
        assert!((min.x - 0.0).abs() < 1e-9);
        assert!((max.x - 960.0).abs() < 1e-9);
        assert!(min.y >= 0.0 && max.y <= 600.0);
    }

    proptest! {
        #[test]
        fn fills_follow_value_order(values in prop::collection::vec(0.0_f64..100.0, 1..24)) {
            let map = strip(values.len() as u64);
            let records: Vec<EducationRecord> = values
                .iter()
                .enumerate()
                .map(|(index, value)| county(index as u32, *value))
                .collect();
            let refs: Vec<&EducationRecord> = records.iter().collect();
            let mut backend = Recorder::default();

            ChoroplethMap::new("#map", "Attainment", map).render(&refs, &mut backend);

            let bands: Vec<usize> = polygon_fills(&backend)
                .into_iter()
                .map(|fill| BLUES9.iter().position(|color| Some(*color) == fill).unwrap_or(usize::MAX))
                .collect();
            prop_assert!(bands.iter().all(|band| *band < BLUES9.len()));

            let mut ranked: Vec<(f64, usize)> = values.iter().copied().zip(bands).collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            prop_assert!(ranked.windows(2).all(|pair| pair[0].1 <= pair[1].1));
        }
    }
}
