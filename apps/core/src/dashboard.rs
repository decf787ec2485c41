//! Dashboard sessions.
//!
//! A [`Dashboard`] owns the full dataset, the filter controller, the panels
//! and the backend they draw into. Both dashboard variants are the same type
//! with different panel lists.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::backend::ChartBackend;
use crate::dataset::Dataset;
use crate::filter::{FilterControl, FilterController};
use crate::loader::LoadedData;
use crate::model::{EducationRecord, FilterKey, Record, SalesRecord, Variant};
use crate::render::{
    BarChart, ChoroplethMap, LineChart, PieChart, PieGrouping, RangeBins, RegionMap, Renderer,
};
use crate::scene::Scene;
use crate::stats::{update_stats, Stats};

/// Source of the refresh timestamp.
pub type Clock = fn() -> DateTime<Local>;

/// Upper edges of the attainment ranges shown in the education pie.
pub const ATTAINMENT_RANGES: [f64; 6] = [0.0, 15.0, 25.0, 35.0, 50.0, 100.0];

pub struct Dashboard<R: Record, B: ChartBackend = Scene> {
    variant: Variant,
    dataset: Dataset<R>,
    filters: FilterController,
    panels: Vec<Box<dyn Renderer<R>>>,
    backend: B,
    clock: Clock,
    stats: Option<Stats>,
}

impl<R: Record, B: ChartBackend> Dashboard<R, B> {
    pub fn new(
        variant: Variant,
        records: Vec<R>,
        panels: Vec<Box<dyn Renderer<R>>>,
        backend: B,
    ) -> Self {
        Self {
            variant,
            dataset: Dataset::new(records),
            filters: FilterController::default(),
            panels,
            backend,
            clock: Local::now,
            stats: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Populates the filter options and draws every panel with all records.
    pub fn init(&mut self) {
        self.filters.init_filters(&self.dataset);
        self.update_charts(&FilterKey::All);
    }

    /// Redraws every panel and the stats line from the records matching
    /// `filter`.
    pub fn update_charts(&mut self, filter: &FilterKey) {
        let subset = self.dataset.select(filter);
        tracing::info!(
            filter = filter.as_str(),
            records = subset.len(),
            "updating charts"
        );
        for panel in &self.panels {
            panel.render(&subset, &mut self.backend);
        }
        let now = (self.clock)();
        self.stats = Some(update_stats(&mut self.backend, &subset, filter, now));
    }

    /// Feeds a select-control change through the filter controller.
    pub fn change_filter(&mut self, value: &str) -> bool {
        match self.filters.on_change(value) {
            Some(key) => {
                self.update_charts(&key);
                true
            }
            None => false,
        }
    }

    pub fn step_filter(&mut self, forward: bool) -> bool {
        match self.filters.step(forward) {
            Some(key) => {
                self.update_charts(&key);
                true
            }
            None => false,
        }
    }

    pub const fn variant(&self) -> Variant {
        self.variant
    }

    pub const fn dataset(&self) -> &Dataset<R> {
        &self.dataset
    }

    pub const fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn panels(&self) -> Vec<PanelInfo> {
        self.panels
            .iter()
            .map(|panel| PanelInfo {
                container: panel.container().to_string(),
                title: panel.title().to_string(),
            })
            .collect()
    }
}

/// Sales dashboard: bar per record, trend line and a pie by name.
pub fn sales_dashboard(records: Vec<SalesRecord>) -> Dashboard<SalesRecord> {
    let panels: Vec<Box<dyn Renderer<SalesRecord>>> = vec![
        Box::new(BarChart::per_record("#chart1", "Sales by Item")),
        Box::new(LineChart::new("#chart2", "Sales Over Time")),
        Box::new(PieChart::new(
            "#chart3",
            "Sales Share",
            PieGrouping::ByLabel,
        )),
    ];
    Dashboard::new(Variant::Sales, records, panels, Scene::new())
}

/// Education dashboard: attainment histogram, range pie and county map.
pub fn education_dashboard(
    records: Vec<EducationRecord>,
    map: Arc<RegionMap>,
) -> Dashboard<EducationRecord> {
    let panels: Vec<Box<dyn Renderer<EducationRecord>>> = vec![
        Box::new(BarChart::binned(
            "#histogram",
            "Counties by Attainment",
            RangeBins::uniform(0.0, 100.0, 10),
        )),
        Box::new(PieChart::new(
            "#pie",
            "Attainment Ranges",
            PieGrouping::ByRange(RangeBins::new(ATTAINMENT_RANGES.to_vec())),
        )),
        Box::new(ChoroplethMap::new(
            "#map",
            "Bachelor's Degree or Higher",
            map,
        )),
    ];
    Dashboard::new(Variant::Education, records, panels, Scene::new())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelInfo {
    pub container: String,
    pub title: String,
}

/// What one panel currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSummary {
    pub container: String,
    pub title: String,
    pub marks: usize,
    pub details: Vec<String>,
    pub legend: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub variant: Variant,
    pub filter_field: String,
    pub filter: String,
    pub options: Vec<String>,
    pub stats: Option<Stats>,
    pub panels: Vec<PanelSummary>,
}

/// Variant-independent view of a running dashboard, used by the front-ends.
pub trait Session {
    fn variant(&self) -> Variant;
    fn filter_field(&self) -> &str;
    fn filter(&self) -> &FilterControl;
    fn change_filter(&mut self, value: &str) -> bool;
    fn step_filter(&mut self, forward: bool) -> bool;
    fn panels(&self) -> Vec<PanelInfo>;
    fn scene(&self) -> &Scene;
    fn stats(&self) -> Option<&Stats>;

    fn summary(&self) -> Summary {
        let scene = self.scene();
        let panels = self
            .panels()
            .into_iter()
            .map(|panel| {
                let surfaces = scene.surfaces(&panel.container);
                PanelSummary {
                    marks: surfaces.iter().map(|surface| surface.marks.len()).sum(),
                    details: scene
                        .hover_targets(&panel.container)
                        .iter()
                        .map(|target| target.hover.label.clone())
                        .collect(),
                    legend: surfaces
                        .iter()
                        .filter_map(|surface| surface.legend.as_ref())
                        .flat_map(|legend| legend.entries.iter().map(|entry| entry.label.clone()))
                        .collect(),
                    container: panel.container,
                    title: panel.title,
                }
            })
            .collect();
        Summary {
            variant: self.variant(),
            filter_field: self.filter_field().to_string(),
            filter: self.filter().value().to_string(),
            options: self.filter().options().to_vec(),
            stats: self.stats().cloned(),
            panels,
        }
    }
}

impl<R: Record> Session for Dashboard<R, Scene> {
    fn variant(&self) -> Variant {
        self.variant
    }

    fn filter_field(&self) -> &str {
        self.filters.field()
    }

    fn filter(&self) -> &FilterControl {
        self.filters.control()
    }

    fn change_filter(&mut self, value: &str) -> bool {
        Self::change_filter(self, value)
    }

    fn step_filter(&mut self, forward: bool) -> bool {
        Self::step_filter(self, forward)
    }

    fn panels(&self) -> Vec<PanelInfo> {
        Self::panels(self)
    }

    fn scene(&self) -> &Scene {
        &self.backend
    }

    fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }
}

impl LoadedData {
    /// Builds the matching dashboard and draws it with every record.
    pub fn into_session(self) -> Box<dyn Session> {
        match self {
            Self::Sales(records) => {
                let mut dashboard = sales_dashboard(records);
                dashboard.init();
                Box::new(dashboard)
            }
            Self::Education { records, map } => {
                let mut dashboard = education_dashboard(records, Arc::new(map));
                dashboard.init();
                Box::new(dashboard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use geojson::FeatureCollection;

    use super::*;
    use crate::stats::{GROUP_COUNT_NODE, RECORD_COUNT_NODE};

    fn fixed_clock() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Local::now)
    }

    fn county(fips: u32, state: &str, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            state: state.to_string(),
            area_name: format!("County {fips}"),
            bachelors_or_higher: value,
        }
    }

    fn sale(name: &str, category: &str, value: f64) -> SalesRecord {
        SalesRecord {
            name: name.to_string(),
            category: category.to_string(),
            value,
            date: "2024-01-01".to_string(),
        }
    }

    fn empty_map() -> Arc<RegionMap> {
        let features = FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        };
        Arc::new(RegionMap::new(features, None))
    }

    fn two_states() -> Dashboard<EducationRecord> {
        let mut dashboard =
            education_dashboard(vec![county(1, "A", 10.0), county(2, "B", 50.0)], empty_map())
                .with_clock(fixed_clock);
        dashboard.init();
        dashboard
    }

    fn text<'a>(dashboard: &'a Dashboard<EducationRecord>, node: &str) -> Option<&'a str> {
        dashboard.backend().text(node)
    }

    #[test]
    fn init_renders_everything() {
        let dashboard = two_states();
        assert_eq!(text(&dashboard, RECORD_COUNT_NODE), Some("2"));
        assert_eq!(text(&dashboard, GROUP_COUNT_NODE), Some("2"));
        assert_eq!(dashboard.filters().control().options(), ["all", "A", "B"]);
    }

    #[test]
    fn selecting_a_state_narrows_the_stats() {
        let mut dashboard = two_states();
        assert!(dashboard.change_filter("A"));
        assert_eq!(text(&dashboard, RECORD_COUNT_NODE), Some("1"));
        assert_eq!(text(&dashboard, GROUP_COUNT_NODE), Some("1"));

        assert!(dashboard.change_filter("all"));
        assert_eq!(text(&dashboard, RECORD_COUNT_NODE), Some("2"));
        assert_eq!(text(&dashboard, GROUP_COUNT_NODE), Some("2"));
    }

    #[test]
    fn filter_options_do_not_shrink_with_the_subset() {
        let mut dashboard = two_states();
        dashboard.change_filter("B");
        assert_eq!(dashboard.filters().control().options(), ["all", "A", "B"]);
    }

    #[test]
    fn panels_draw_exactly_the_selected_subset() {
        let mut dashboard = sales_dashboard(vec![
            sale("Apples", "Fruit", 10.0),
            sale("Kale", "Veg", 4.0),
            sale("Pears", "Fruit", 6.0),
        ])
        .with_clock(fixed_clock);
        dashboard.init();

        let bars = |dashboard: &Dashboard<SalesRecord>| -> Vec<String> {
            dashboard
                .backend()
                .hover_targets("#chart1")
                .iter()
                .map(|target| target.hover.label.clone())
                .collect()
        };
        assert_eq!(bars(&dashboard), ["Apples: 10", "Kale: 4", "Pears: 6"]);

        dashboard.change_filter("Fruit");
        assert_eq!(bars(&dashboard), ["Apples: 10", "Pears: 6"]);
    }

    #[test]
    fn rerendering_keeps_one_surface_per_container() {
        let mut dashboard = two_states();
        dashboard.step_filter(true);
        dashboard.step_filter(true);
        dashboard.update_charts(&FilterKey::All);

        for panel in dashboard.panels() {
            assert_eq!(dashboard.backend().surfaces(&panel.container).len(), 1);
        }
    }

    #[test]
    fn summary_reports_panels_and_filter() {
        let mut dashboard = two_states();
        dashboard.change_filter("B");
        let summary = Session::summary(&dashboard);

        assert_eq!(summary.variant, Variant::Education);
        assert_eq!(summary.filter_field, "state");
        assert_eq!(summary.filter, "B");
        assert_eq!(summary.stats.map(|stats| stats.record_count), Some(1));
        assert_eq!(summary.panels.len(), 3);
        assert_eq!(summary.panels[0].container, "#histogram");
        assert_eq!(summary.panels[1].details, ["50-100: 1 (100.0%)"]);
    }

    #[test]
    fn loaded_data_becomes_a_drawn_session() {
        let session = LoadedData::Sales(vec![sale("Apples", "Fruit", 10.0)]).into_session();
        assert_eq!(session.variant(), Variant::Sales);
        assert_eq!(session.filter().options(), ["all", "Fruit"]);
        assert_eq!(session.scene().surfaces("#chart3").len(), 1);
    }
}
