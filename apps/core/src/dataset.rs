use std::collections::BTreeSet;

use crate::model::{FilterKey, Record};

/// The full set of records loaded for a session.
///
/// The distinct filter keys are computed once here, from every record, so the
/// filter options stay stable no matter which subset is on screen.
#[derive(Debug, Clone)]
pub struct Dataset<R> {
    records: Vec<R>,
    keys: Vec<String>,
}

impl<R: Record> Dataset<R> {
    pub fn new(records: Vec<R>) -> Self {
        let keys = distinct_keys(records.iter());
        Self { records, keys }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Sorted distinct values of the filter field.
    pub fn filter_keys(&self) -> &[String] {
        &self.keys
    }

    /// Records matching `filter`, in load order.
    pub fn select(&self, filter: &FilterKey) -> Vec<&R> {
        self.records
            .iter()
            .filter(|record| filter.matches(record.filter_key()))
            .collect()
    }
}

/// Sorted distinct filter keys over `records`.
pub fn distinct_keys<'a, R: Record>(records: impl Iterator<Item = &'a R>) -> Vec<String> {
    records
        .map(|record| record.filter_key().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EducationRecord;

    fn county(fips: u32, state: &str, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            state: state.to_string(),
            area_name: format!("County {fips}"),
            bachelors_or_higher: value,
        }
    }

    #[test]
    fn keys_are_sorted_and_unique() {
        let dataset = Dataset::new(vec![
            county(1, "TX", 10.0),
            county(2, "AL", 20.0),
            county(3, "TX", 30.0),
        ]);
        assert_eq!(dataset.filter_keys(), ["AL", "TX"]);
    }

    #[test]
    fn select_returns_exact_subset() {
        let dataset = Dataset::new(vec![county(1, "A", 10.0), county(2, "B", 50.0)]);

        let all = dataset.select(&FilterKey::All);
        assert_eq!(all.len(), 2);

        let only_a = dataset.select(&FilterKey::from_value("A"));
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].fips, 1);

        assert!(dataset.select(&FilterKey::from_value("Z")).is_empty());
    }

    #[test]
    fn keys_do_not_depend_on_selection() {
        let dataset = Dataset::new(vec![county(1, "A", 10.0), county(2, "B", 50.0)]);
        let _ = dataset.select(&FilterKey::from_value("A"));
        assert_eq!(dataset.filter_keys().len(), 2);
    }
}
