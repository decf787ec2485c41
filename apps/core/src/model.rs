use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Option value that selects every record.
pub const ALL: &str = "all";

/// One row of a dashboard dataset.
pub trait Record: Clone + 'static {
    /// Name of the field the dashboard filters on.
    const FILTER_FIELD: &'static str;

    fn filter_key(&self) -> &str;
    fn label(&self) -> &str;
    fn value(&self) -> f64;
}

/// Accepts any JSON value for a numeric field. Anything but a number, a
/// missing field included, becomes NaN and is left for the charts to skip.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(f64::NAN))
}

/// County ids arrive as numbers or zero-padded strings; anything else maps to
/// 0, which no feature carries.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => number
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(0),
        Some(serde_json::Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

const fn not_a_number() -> f64 {
    f64::NAN
}

/// Records that can be placed on a time axis.
pub trait Dated: Record {
    fn date(&self) -> Option<NaiveDate>;
}

/// Records that can be joined to a map feature.
pub trait Regional: Record {
    fn region_id(&self) -> u32;
}

/// A row of the sales dataset (`data/data.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub value: f64,
    #[serde(default)]
    pub date: String,
}

impl Record for SalesRecord {
    const FILTER_FIELD: &'static str = "category";

    fn filter_key(&self) -> &str {
        &self.category
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl Dated for SalesRecord {
    fn date(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|stamp| stamp.date_naive())
            })
    }
}

/// A county row of the education dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub fips: u32,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub area_name: String,
    #[serde(
        rename = "bachelorsOrHigher",
        default = "not_a_number",
        deserialize_with = "lenient_number"
    )]
    pub bachelors_or_higher: f64,
}

impl Record for EducationRecord {
    const FILTER_FIELD: &'static str = "state";

    fn filter_key(&self) -> &str {
        &self.state
    }

    fn label(&self) -> &str {
        &self.area_name
    }

    fn value(&self) -> f64 {
        self.bachelors_or_higher
    }
}

impl Regional for EducationRecord {
    fn region_id(&self) -> u32 {
        self.fips
    }
}

/// The currently selected filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterKey {
    #[default]
    All,
    Key(String),
}

impl FilterKey {
    /// Interprets a select-control value; `"all"` is always the sentinel.
    pub fn from_value(value: &str) -> Self {
        if value == ALL {
            Self::All
        } else {
            Self::Key(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::Key(key) => key,
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Key(selected) => selected == key,
        }
    }
}

/// Which dashboard is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Sales,
    Education,
}

impl Variant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Education => "education",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sales" => Some(Self::Sales),
            "education" => Some(Self::Education),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales Dashboard",
            Self::Education => "US Educational Attainment",
        }
    }
}
