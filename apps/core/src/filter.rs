use crate::dataset::Dataset;
use crate::model::{FilterKey, Record, ALL};

/// Model of the filter select control: option values in display order and
/// the selected one. The first option is always `"all"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    options: Vec<String>,
    selected: usize,
}

impl Default for FilterControl {
    fn default() -> Self {
        Self {
            options: vec![ALL.to_string()],
            selected: 0,
        }
    }
}

impl FilterControl {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn value(&self) -> &str {
        self.options
            .get(self.selected)
            .map_or(ALL, String::as_str)
    }

    /// Selects `value`; unknown values leave the selection untouched.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|option| option == value) {
            Some(index) if index != self.selected => {
                self.selected = index;
                true
            }
            _ => false,
        }
    }

    pub fn select_next(&mut self) -> bool {
        let len = self.options.len();
        if len < 2 {
            return false;
        }
        self.selected = (self.selected + 1) % len;
        true
    }

    pub fn select_previous(&mut self) -> bool {
        let len = self.options.len();
        if len < 2 {
            return false;
        }
        self.selected = (self.selected + len - 1) % len;
        true
    }

    fn replace_options(&mut self, keys: &[String]) {
        self.options.clear();
        self.options.push(ALL.to_string());
        self.options
            .extend(keys.iter().filter(|key| key.as_str() != ALL).cloned());
        self.selected = 0;
    }
}

/// Owns the select control and turns its changes into filter keys.
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    control: FilterControl,
    field: &'static str,
    attached: bool,
}

impl FilterController {
    /// Rebuilds the options from the full dataset and (re)attaches the change
    /// listener. Calling it again replaces the previous options.
    pub fn init_filters<R: Record>(&mut self, dataset: &Dataset<R>) {
        self.control.replace_options(dataset.filter_keys());
        self.field = R::FILTER_FIELD;
        self.attached = true;
        tracing::debug!(
            field = self.field,
            options = self.control.options().len(),
            "filter options populated"
        );
    }

    pub const fn control(&self) -> &FilterControl {
        &self.control
    }

    pub const fn field(&self) -> &'static str {
        self.field
    }

    pub fn current(&self) -> FilterKey {
        FilterKey::from_value(self.control.value())
    }

    /// Handles a change event from the control. Returns the key to redraw
    /// with, or `None` when nothing changed or no listener is attached.
    pub fn on_change(&mut self, value: &str) -> Option<FilterKey> {
        if !self.attached || !self.control.select(value) {
            return None;
        }
        Some(self.current())
    }

    /// Moves the selection one option forwards or backwards.
    pub fn step(&mut self, forward: bool) -> Option<FilterKey> {
        if !self.attached {
            return None;
        }
        let changed = if forward {
            self.control.select_next()
        } else {
            self.control.select_previous()
        };
        changed.then(|| self.current())
    }
}
