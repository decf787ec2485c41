//! Shared core of the chart dashboards: loading, filtering, scales and the
//! retained chart scene that the terminal and browser front-ends paint.

pub mod backend;
pub mod dashboard;
pub mod dataset;
pub mod filter;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod render;
pub mod scale;
pub mod scene;
pub mod stats;
pub mod topology;

pub use backend::{ChartBackend, Hover, HoverEffect, Mark, Point, Rgb, Shape, Style};
pub use dashboard::{education_dashboard, sales_dashboard, Dashboard, PanelInfo, Session, Summary};
pub use dataset::Dataset;
pub use filter::{FilterControl, FilterController};
pub use loader::{load, LoadError, LoadedData, Sources};
pub use model::{EducationRecord, FilterKey, Record, SalesRecord, Variant, ALL};
pub use scene::{HoverTarget, Scene, Surface};
pub use stats::{update_stats, Stats};
