use chrono::{DateTime, Local};
use serde::Serialize;

use crate::backend::ChartBackend;
use crate::dataset::distinct_keys;
use crate::model::{FilterKey, Record};

pub const RECORD_COUNT_NODE: &str = "record-count";
pub const GROUP_COUNT_NODE: &str = "group-count";
pub const LAST_UPDATE_NODE: &str = "last-update";

/// Summary shown in the stats line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub record_count: usize,
    pub group_count: usize,
    pub last_update: DateTime<Local>,
}

impl Stats {
    /// A specific key always counts as one group; `all` counts the distinct
    /// keys of `records`.
    pub fn compute<R: Record>(records: &[&R], filter: &FilterKey, now: DateTime<Local>) -> Self {
        let group_count = match filter {
            FilterKey::Key(_) => 1,
            FilterKey::All => distinct_keys(records.iter().copied()).len(),
        };
        Self {
            record_count: records.len(),
            group_count,
            last_update: now,
        }
    }

    pub fn time_label(&self) -> String {
        self.last_update.format("%H:%M:%S").to_string()
    }
}

/// Writes the stats for `records` into the stats text nodes.
pub fn update_stats<R: Record>(
    backend: &mut dyn ChartBackend,
    records: &[&R],
    filter: &FilterKey,
    now: DateTime<Local>,
) -> Stats {
    let stats = Stats::compute(records, filter, now);
    backend.set_text(RECORD_COUNT_NODE, stats.record_count.to_string());
    backend.set_text(GROUP_COUNT_NODE, stats.group_count.to_string());
    backend.set_text(LAST_UPDATE_NODE, stats.time_label());
    stats
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::EducationRecord;
    use crate::scene::Scene;

    fn county(state: &str, value: f64) -> EducationRecord {
        EducationRecord {
            fips: 1,
            state: state.to_string(),
            area_name: "County".to_string(),
            bachelors_or_higher: value,
        }
    }

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 5)
            .single()
            .unwrap_or_else(Local::now)
    }

    #[test]
    fn all_counts_distinct_keys() {
        let records = [county("A", 10.0), county("B", 50.0), county("B", 20.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let stats = Stats::compute(&refs, &FilterKey::All, noon());
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.group_count, 2);
    }

    #[test]
    fn a_selected_key_is_one_group() {
        let records = [county("A", 10.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let stats = Stats::compute(&refs, &FilterKey::Key("A".to_string()), noon());
        assert_eq!(stats.group_count, 1);
    }

    #[test]
    fn text_nodes_are_written() {
        let records = [county("A", 10.0), county("B", 50.0)];
        let refs: Vec<&EducationRecord> = records.iter().collect();
        let mut scene = Scene::new();
        let now = noon();

        update_stats(&mut scene, &refs, &FilterKey::All, now);

        assert_eq!(scene.text(RECORD_COUNT_NODE), Some("2"));
        assert_eq!(scene.text(GROUP_COUNT_NODE), Some("2"));
        assert_eq!(
            scene.text(LAST_UPDATE_NODE),
            Some(now.format("%H:%M:%S").to_string().as_str())
        );
    }
}
