//! Dataset loading.
//!
//! Resources are fetched concurrently through a caller-supplied fetch
//! function, so the same loader runs on tokio in the terminal and on the
//! browser event loop in the web app.

use std::future::Future;

use futures::future::try_join_all;
use thiserror::Error;

use crate::model::{EducationRecord, SalesRecord, Variant};
use crate::render::RegionMap;
use crate::topology::{self, Topology, TopologyError};

pub const DEFAULT_SALES_DATA: &str = "data/data.json";
pub const DEFAULT_TOPOLOGY: &str = "data/counties.json";
pub const DEFAULT_EDUCATION: &str = "data/for_user_education.json";

/// Topology object holding one polygon per county.
pub const COUNTY_OBJECT: &str = "counties";
/// Topology object whose interior arcs become the state border mesh.
pub const BORDER_OBJECT: &str = "states";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },
    #[error("failed to parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid topology in {location}: {source}")]
    Topology {
        location: String,
        #[source]
        source: TopologyError,
    },
}

impl LoadError {
    pub fn fetch(location: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.to_string(),
        }
    }
}

/// Where a dashboard's resources live: URLs or local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    Sales { data: String },
    Education { topology: String, education: String },
}

impl Sources {
    pub fn defaults(variant: Variant) -> Self {
        match variant {
            Variant::Sales => Self::Sales {
                data: DEFAULT_SALES_DATA.to_string(),
            },
            Variant::Education => Self::Education {
                topology: DEFAULT_TOPOLOGY.to_string(),
                education: DEFAULT_EDUCATION.to_string(),
            },
        }
    }

    pub const fn variant(&self) -> Variant {
        match self {
            Self::Sales { .. } => Variant::Sales,
            Self::Education { .. } => Variant::Education,
        }
    }

    /// Every location, in fetch order.
    pub fn locations(&self) -> Vec<&str> {
        match self {
            Self::Sales { data } => vec![data],
            Self::Education {
                topology,
                education,
            } => vec![topology, education],
        }
    }
}

#[derive(Debug)]
pub enum LoadedData {
    Sales(Vec<SalesRecord>),
    Education {
        records: Vec<EducationRecord>,
        map: RegionMap,
    },
}

impl LoadedData {
    pub fn record_count(&self) -> usize {
        match self {
            Self::Sales(records) => records.len(),
            Self::Education { records, .. } => records.len(),
        }
    }
}

/// Fetches every resource of `sources` concurrently and decodes them.
///
/// The first failing fetch fails the whole load.
pub async fn load<F, Fut>(sources: &Sources, fetch: F) -> Result<LoadedData, LoadError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, LoadError>>,
{
    let locations = sources.locations();
    tracing::info!(variant = sources.variant().as_str(), ?locations, "loading dataset");
    let bodies = try_join_all(locations.iter().map(|location| fetch((*location).to_string()))).await?;
    decode(sources, &bodies)
}

/// Decodes fetched bodies, given in the order of [`Sources::locations`].
pub fn decode(sources: &Sources, bodies: &[Vec<u8>]) -> Result<LoadedData, LoadError> {
    match (sources, bodies) {
        (Sources::Sales { data }, [body]) => {
            let records: Vec<SalesRecord> = parse(data, body)?;
            tracing::debug!(records = records.len(), "sales records parsed");
            Ok(LoadedData::Sales(records))
        }
        (
            Sources::Education {
                topology,
                education,
            },
            [topology_body, education_body],
        ) => {
            let decoded: Topology = parse(topology, topology_body)?;
            let records: Vec<EducationRecord> = parse(education, education_body)?;
            let map = region_map(topology, &decoded)?;
            tracing::debug!(
                records = records.len(),
                features = map.len(),
                "education data decoded"
            );
            Ok(LoadedData::Education { records, map })
        }
        _ => Err(LoadError::fetch(
            sources.locations().join(", "),
            format!("expected {} bodies, got {}", sources.locations().len(), bodies.len()),
        )),
    }
}

fn parse<T: serde::de::DeserializeOwned>(location: &str, body: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(body).map_err(|source| LoadError::Parse {
        location: location.to_string(),
        source,
    })
}

fn region_map(location: &str, decoded: &Topology) -> Result<RegionMap, LoadError> {
    let as_load_error = |source| LoadError::Topology {
        location: location.to_string(),
        source,
    };
    let counties = topology::feature(decoded, COUNTY_OBJECT).map_err(as_load_error)?;
    let borders = if decoded.objects.contains_key(BORDER_OBJECT) {
        Some(topology::interior_mesh(decoded, BORDER_OBJECT).map_err(as_load_error)?)
    } else {
        tracing::warn!(location, "topology has no state borders");
        None
    };
    Ok(RegionMap::new(counties, borders))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[1, 0], [1, 1]],
            [[1, 1], [0, 1], [0, 0], [1, 0]],
            [[1, 0], [2, 0], [2, 1], [1, 1]]
        ],
        "objects": {
            "counties": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": 1001, "arcs": [[0, 1]]},
                    {"type": "Polygon", "id": 2001, "arcs": [[-1, 2]]}
                ]
            },
            "states": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "01", "arcs": [[0, 1]]},
                    {"type": "Polygon", "id": "02", "arcs": [[-1, 2]]}
                ]
            }
        }
    }"#;

    const EDUCATION: &str = r#"[
        {"fips": 1001, "state": "A", "area_name": "Left County", "bachelorsOrHigher": 10},
        {"fips": 2001, "state": "B", "area_name": "Right County", "bachelorsOrHigher": 50}
    ]"#;

    const SALES: &str = r#"[
        {"name": "Apples", "category": "Fruit", "value": 10, "date": "2024-01-01"},
        {"name": "Kale", "category": "Veg", "value": 4, "date": "2024-01-02"}
    ]"#;

    fn education_sources() -> Sources {
        Sources::Education {
            topology: "counties.json".to_string(),
            education: "education.json".to_string(),
        }
    }

    fn fetcher(
        files: HashMap<&'static str, &'static str>,
    ) -> impl Fn(String) -> std::future::Ready<Result<Vec<u8>, LoadError>> {
        move |location: String| {
            let body = files.get(location.as_str()).map(|body| body.as_bytes().to_vec());
            std::future::ready(body.ok_or_else(|| LoadError::fetch(location, "not found")))
        }
    }

    #[tokio::test]
    async fn sales_records_are_parsed() {
        let sources = Sources::Sales {
            data: "data.json".to_string(),
        };
        let loaded = load(&sources, fetcher(HashMap::from([("data.json", SALES)])))
            .await
            .unwrap();

        let LoadedData::Sales(records) = loaded else {
            panic!("expected sales data");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].category, "Veg");
    }

    #[test]
    fn bad_records_load_alongside_good_ones() {
        let sources = Sources::Sales {
            data: "d.json".to_string(),
        };
        let body = br#"[
            {"name": "Apples", "category": "Fruit", "value": 10, "date": "2024-01-01"},
            {"name": "Pears", "category": "Fruit", "value": null, "date": "2024-01-02"},
            {"name": "Kale", "category": "Veg", "value": "12"},
            {"category": "Veg", "value": 3}
        ]"#;

        let loaded = decode(&sources, &[body.to_vec()]).unwrap();
        let LoadedData::Sales(records) = loaded else {
            panic!("expected sales data");
        };
        assert_eq!(records.len(), 4);
        assert!((records[0].value - 10.0).abs() < 1e-9);
        assert!(records[1].value.is_nan());
        assert!(records[2].value.is_nan());
        assert_eq!(records[2].date, "");
        assert_eq!(records[3].name, "");
        assert!((records[3].value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn bad_education_rows_keep_the_load_alive() {
        let body = br#"[
            {"fips": "01001", "state": "A", "area_name": "Padded", "bachelorsOrHigher": 20},
            {"fips": null, "state": "B", "bachelorsOrHigher": "n/a"},
            {"state": "C"}
        ]"#;
        let files = [TOPOLOGY.as_bytes().to_vec(), body.to_vec()];

        let loaded = decode(&education_sources(), &files).unwrap();
        let LoadedData::Education { records, .. } = loaded else {
            panic!("expected education data");
        };
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].fips, 1001);
        assert_eq!(records[1].fips, 0);
        assert!(records[1].bachelors_or_higher.is_nan());
        assert!(records[2].bachelors_or_higher.is_nan());
    }

    #[tokio::test]
    async fn education_load_builds_features_and_borders() {
        let files = HashMap::from([("counties.json", TOPOLOGY), ("education.json", EDUCATION)]);
        let loaded = load(&education_sources(), fetcher(files)).await.unwrap();

        let LoadedData::Education { records, map } = loaded else {
            panic!("expected education data");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(map.len(), 2);
        let borders = map.borders().map(|geometry| &geometry.value);
        assert_eq!(
            borders,
            Some(&geojson::Value::MultiLineString(vec![vec![
                vec![1.0, 0.0],
                vec![1.0, 1.0]
            ]]))
        );
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_load() {
        let files = HashMap::from([("counties.json", TOPOLOGY)]);
        let error = load(&education_sources(), fetcher(files)).await.unwrap_err();
        assert!(matches!(error, LoadError::Fetch { location, .. } if location == "education.json"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let files = HashMap::from([("counties.json", TOPOLOGY), ("education.json", "[{")]);
        let error = load(&education_sources(), fetcher(files)).await.unwrap_err();
        assert!(matches!(error, LoadError::Parse { location, .. } if location == "education.json"));
    }

    #[tokio::test]
    async fn missing_county_object_is_a_topology_error() {
        let topology = r#"{"type": "Topology", "arcs": [], "objects": {}}"#;
        let files = HashMap::from([("counties.json", topology), ("education.json", EDUCATION)]);
        let error = load(&education_sources(), fetcher(files)).await.unwrap_err();
        assert!(matches!(error, LoadError::Topology { .. }));
    }

    #[test]
    fn sources_list_locations_in_fetch_order() {
        assert_eq!(
            education_sources().locations(),
            ["counties.json", "education.json"]
        );
        assert_eq!(Sources::defaults(Variant::Sales).variant(), Variant::Sales);
    }
}
