//! TopoJSON decoding.
//!
//! Converts a topology object into a GeoJSON feature collection and extracts
//! border meshes from arcs shared between geometries.

use std::collections::BTreeMap;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("arc index {0} is out of range")]
    ArcOutOfRange(i64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: BTreeMap<String, TopoGeometry>,
}

/// Quantization transform; arc positions are delta-encoded when present.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Position {
        vec![
            x.mul_add(self.scale[0], self.translate[0]),
            y.mul_add(self.scale[1], self.translate[1]),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopoGeometry {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<JsonObject>,
    #[serde(flatten)]
    pub shape: TopoShape,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoShape {
    GeometryCollection { geometries: Vec<TopoGeometry> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
}

impl Topology {
    pub fn object(&self, name: &str) -> Result<&TopoGeometry, TopologyError> {
        self.objects
            .get(name)
            .ok_or_else(|| TopologyError::MissingObject(name.to_string()))
    }
}

/// Converts the named object into a feature collection.
///
/// A geometry collection yields one feature per member; any other geometry
/// yields a single feature.
pub fn feature(topology: &Topology, object: &str) -> Result<FeatureCollection, TopologyError> {
    let decoder = ArcDecoder::new(topology);
    let root = topology.object(object)?;

    let features = match &root.shape {
        TopoShape::GeometryCollection { geometries } => geometries
            .iter()
            .map(|geometry| decoder.feature(geometry))
            .collect::<Result<Vec<_>, _>>()?,
        _ => vec![decoder.feature(root)?],
    };

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Builds a multi-line geometry from the arcs of `object` accepted by `filter`.
///
/// `filter` receives the indices of the first and last leaf geometries that
/// reference an arc; `|a, b| a != b` keeps only interior borders.
pub fn mesh(
    topology: &Topology,
    object: &str,
    filter: impl Fn(usize, usize) -> bool,
) -> Result<Geometry, TopologyError> {
    let decoder = ArcDecoder::new(topology);
    let root = topology.object(object)?;

    let mut geoms_by_arc: Vec<Vec<usize>> = vec![Vec::new(); decoder.arcs.len()];
    let mut leaf = 0;
    collect_arc_owners(root, &mut leaf, &mut geoms_by_arc)?;

    let lines = geoms_by_arc
        .iter()
        .enumerate()
        .filter_map(|(index, owners)| {
            let (first, last) = (owners.first()?, owners.last()?);
            filter(*first, *last).then(|| decoder.arcs[index].clone())
        })
        .collect();

    Ok(Geometry::new(Value::MultiLineString(lines)))
}

/// Borders shared by two different geometries of `object`.
pub fn interior_mesh(topology: &Topology, object: &str) -> Result<Geometry, TopologyError> {
    mesh(topology, object, |a, b| a != b)
}

fn collect_arc_owners(
    geometry: &TopoGeometry,
    leaf: &mut usize,
    owners: &mut [Vec<usize>],
) -> Result<(), TopologyError> {
    let owner = *leaf;
    match &geometry.shape {
        TopoShape::GeometryCollection { geometries } => {
            for child in geometries {
                collect_arc_owners(child, leaf, owners)?;
            }
            return Ok(());
        }
        TopoShape::Point { .. } | TopoShape::MultiPoint { .. } => {}
        TopoShape::LineString { arcs } => mark_owner(arcs, owner, owners)?,
        TopoShape::MultiLineString { arcs } | TopoShape::Polygon { arcs } => {
            for line in arcs {
                mark_owner(line, owner, owners)?;
            }
        }
        TopoShape::MultiPolygon { arcs } => {
            for polygon in arcs {
                for ring in polygon {
                    mark_owner(ring, owner, owners)?;
                }
            }
        }
    }

    *leaf += 1;
    Ok(())
}

fn mark_owner(arcs: &[i64], owner: usize, owners: &mut [Vec<usize>]) -> Result<(), TopologyError> {
    for &index in arcs {
        owners
            .get_mut(arc_slot(index))
            .ok_or(TopologyError::ArcOutOfRange(index))?
            .push(owner);
    }
    Ok(())
}

const fn arc_slot(index: i64) -> usize {
    if index < 0 {
        (!index) as usize
    } else {
        index as usize
    }
}

struct ArcDecoder {
    transform: Option<Transform>,
    arcs: Vec<Vec<Position>>,
}

impl ArcDecoder {
    fn new(topology: &Topology) -> Self {
        let transform = topology.transform;
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, transform.as_ref()))
            .collect();
        Self { transform, arcs }
    }

    fn arc(&self, index: i64) -> Result<Vec<Position>, TopologyError> {
        let points = self
            .arcs
            .get(arc_slot(index))
            .ok_or(TopologyError::ArcOutOfRange(index))?;
        if index < 0 {
            Ok(points.iter().rev().cloned().collect())
        } else {
            Ok(points.clone())
        }
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points: Vec<Position> = Vec::new();
        for &index in arcs {
            let arc = self.arc(index)?;
            // consecutive arcs share their junction point
            if !points.is_empty() {
                points.pop();
            }
            points.extend(arc);
        }
        pad(&mut points, 2);
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = self.line(arcs)?;
        pad(&mut points, 4);
        Ok(points)
    }

    fn point(&self, coordinates: &[f64]) -> Position {
        match (self.transform, coordinates) {
            (Some(transform), [x, y, ..]) => transform.apply(*x, *y),
            _ => coordinates.to_vec(),
        }
    }

    fn geometry(&self, shape: &TopoShape) -> Result<Value, TopologyError> {
        let value = match shape {
            TopoShape::GeometryCollection { geometries } => Value::GeometryCollection(
                geometries
                    .iter()
                    .map(|child| self.geometry(&child.shape).map(Geometry::new))
                    .collect::<Result<_, _>>()?,
            ),
            TopoShape::Point { coordinates } => Value::Point(self.point(coordinates)),
            TopoShape::MultiPoint { coordinates } => Value::MultiPoint(
                coordinates.iter().map(|point| self.point(point)).collect(),
            ),
            TopoShape::LineString { arcs } => Value::LineString(self.line(arcs)?),
            TopoShape::MultiLineString { arcs } => Value::MultiLineString(
                arcs.iter()
                    .map(|line| self.line(line))
                    .collect::<Result<_, _>>()?,
            ),
            TopoShape::Polygon { arcs } => Value::Polygon(
                arcs.iter()
                    .map(|ring| self.ring(ring))
                    .collect::<Result<_, _>>()?,
            ),
            TopoShape::MultiPolygon { arcs } => Value::MultiPolygon(
                arcs.iter()
                    .map(|polygon| {
                        polygon
                            .iter()
                            .map(|ring| self.ring(ring))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(value)
    }

    fn feature(&self, geometry: &TopoGeometry) -> Result<Feature, TopologyError> {
        Ok(Feature {
            bbox: None,
            geometry: Some(Geometry::new(self.geometry(&geometry.shape)?)),
            id: geometry.id.as_ref().and_then(feature_id),
            properties: geometry.properties.clone(),
            foreign_members: None,
        })
    }
}

fn decode_arc(arc: &[Vec<f64>], transform: Option<&Transform>) -> Vec<Position> {
    let Some(transform) = transform else {
        return arc.to_vec();
    };

    let (mut x, mut y) = (0.0, 0.0);
    arc.iter()
        .filter_map(|position| match position.as_slice() {
            [dx, dy, ..] => {
                x += dx;
                y += dy;
                Some(transform.apply(x, y))
            }
            _ => None,
        })
        .collect()
}

fn pad(points: &mut Vec<Position>, min_len: usize) {
    if let Some(first) = points.first().cloned() {
        while points.len() < min_len {
            points.push(first.clone());
        }
    }
}

fn feature_id(value: &serde_json::Value) -> Option<Id> {
    match value {
        serde_json::Value::Number(number) => Some(Id::Number(number.clone())),
        serde_json::Value::String(text) => Some(Id::String(text.clone())),
        _ => None,
    }
}

/// Numeric identifier of a feature, accepting numbers and numeric strings.
pub fn numeric_id(feature: &Feature) -> Option<u32> {
    match feature.id.as_ref()? {
        Id::Number(number) => number.as_u64().and_then(|id| u32::try_from(id).ok()),
        Id::String(text) => text.trim().parse().ok(),
    }
}
