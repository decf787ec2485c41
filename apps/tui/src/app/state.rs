use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use dashboard_core::{load, LoadError, LoadedData, Session};
use throbber_widgets_tui::ThrobberState;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::fetch::Fetcher;

const THROBBER_TICK: Duration = Duration::from_millis(100);

type LoadTask = JoinHandle<Result<LoadedData, LoadError>>;

pub enum LoadState {
    Loading,
    Ready(Box<dyn Session>),
    Failed(String),
}

pub struct App {
    pub running: bool,
    pub config: AppConfig,
    pub initial_filter: Option<String>,
    pub load_state: LoadState,
    pub focused_panel: usize,
    pub hovered: Option<usize>,
    pub show_help: bool,
    pub status_message: String,
    pub throbber: ThrobberState,
    pub last_frame: Instant,
    pub loaded_at: Option<DateTime<Local>>,
    fetcher: Fetcher,
    pending: Option<LoadTask>,
}

impl App {
    pub fn new(config: AppConfig, initial_filter: Option<String>) -> Self {
        Self {
            running: true,
            config,
            initial_filter,
            load_state: LoadState::Loading,
            focused_panel: 0,
            hovered: None,
            show_help: false,
            status_message: String::new(),
            throbber: ThrobberState::default(),
            last_frame: Instant::now(),
            loaded_at: None,
            fetcher: Fetcher::default(),
            pending: None,
        }
    }

    /// Drops the current session and starts loading every resource again.
    pub fn start_load(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.load_state = LoadState::Loading;
        self.focused_panel = 0;
        self.hovered = None;
        self.status_message = "Loading data...".to_string();

        let sources = self.config.sources.clone();
        let fetcher = self.fetcher.clone();
        self.pending = Some(tokio::spawn(async move {
            load(&sources, |location| {
                let fetcher = fetcher.clone();
                async move { fetcher.fetch(location).await }
            })
            .await
        }));
    }

    /// Picks up the background load once it has finished.
    pub async fn poll_load(&mut self) {
        if !self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(task) = self.pending.take() else {
            return;
        };
        match task.await {
            Ok(result) => self.finish_load(result),
            Err(error) => {
                tracing::error!(%error, "load task failed");
                self.fail(error.to_string());
            }
        }
    }

    /// Loads in the foreground; used when there is no UI to keep alive.
    pub async fn load_now(&mut self) {
        let fetcher = self.fetcher.clone();
        let result = load(&self.config.sources, |location| fetcher.fetch(location)).await;
        self.finish_load(result);
    }

    pub fn finish_load(&mut self, result: Result<LoadedData, LoadError>) {
        let data = match result {
            Ok(data) => data,
            Err(error) => {
                tracing::error!(%error, "failed to load dashboard data");
                self.fail(error.to_string());
                return;
            }
        };

        let records = data.record_count();
        let mut session = data.into_session();
        if let Some(filter) = self.initial_filter.as_deref() {
            if session.filter().value() != filter && !session.change_filter(filter) {
                tracing::warn!(filter, "initial filter is not one of the options");
            }
        }

        tracing::info!(records, variant = session.variant().as_str(), "dashboard ready");
        self.status_message = format!("Loaded {records} records");
        self.loaded_at = Some(Local::now());
        self.load_state = LoadState::Ready(session);
    }

    fn fail(&mut self, message: String) {
        self.status_message = "Data not loaded".to_string();
        self.load_state = LoadState::Failed(message);
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading)
    }

    pub fn session(&self) -> Option<&dyn Session> {
        match &self.load_state {
            LoadState::Ready(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut (dyn Session + 'static)> {
        match &mut self.load_state {
            LoadState::Ready(session) => Some(session.as_mut()),
            _ => None,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.session().map_or(0, |session| session.panels().len())
    }

    /// Container of the panel that has keyboard focus.
    pub fn focused_container(&self) -> Option<String> {
        self.session()?
            .panels()
            .get(self.focused_panel)
            .map(|panel| panel.container.clone())
    }

    pub fn hover_count(&self) -> usize {
        match (self.session(), self.focused_container()) {
            (Some(session), Some(container)) => session.scene().hover_targets(&container).len(),
            _ => 0,
        }
    }

    /// Tooltip text of the hovered mark.
    pub fn hover_label(&self) -> Option<String> {
        let session = self.session()?;
        let container = self.focused_container()?;
        let target = session.scene().hover(&container, self.hovered?)?;
        Some(target.hover.label.clone())
    }

    pub fn step_filter(&mut self, forward: bool) {
        let Some(session) = self.session_mut() else {
            return;
        };
        if session.step_filter(forward) {
            let value = session.filter().value().to_string();
            self.hovered = None;
            self.status_message = format!("Filter: {value}");
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_frame) >= THROBBER_TICK {
            self.last_frame = now;
            if self.is_loading() {
                self.throbber.calc_next();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{SalesRecord, Sources};

    fn config() -> AppConfig {
        AppConfig {
            sources: Sources::Sales {
                data: "data.json".to_string(),
            },
            log_file: None,
            debug: false,
        }
    }

    fn sale(name: &str, category: &str) -> SalesRecord {
        SalesRecord {
            name: name.to_string(),
            category: category.to_string(),
            value: 3.0,
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn successful_load_builds_a_session() {
        let mut app = App::new(config(), Some("Veg".to_string()));
        app.finish_load(Ok(LoadedData::Sales(vec![
            sale("Apples", "Fruit"),
            sale("Kale", "Veg"),
        ])));

        let session = app.session().unwrap();
        assert_eq!(session.filter().value(), "Veg");
        assert_eq!(app.panel_count(), 3);
        assert!(app.loaded_at.is_some());
        assert!(!app.is_loading());
    }

    #[test]
    fn failed_load_shows_not_loaded() {
        let mut app = App::new(config(), None);
        app.finish_load(Err(LoadError::fetch("data.json", "connection refused")));

        assert!(app.session().is_none());
        assert!(!app.is_loading());
        assert_eq!(app.status_message, "Data not loaded");
        assert!(matches!(&app.load_state, LoadState::Failed(message) if message.contains("data.json")));
    }

    #[test]
    fn hover_labels_follow_the_focused_panel() {
        let mut app = App::new(config(), None);
        app.finish_load(Ok(LoadedData::Sales(vec![sale("Apples", "Fruit")])));

        app.hovered = Some(0);
        assert_eq!(app.hover_label().as_deref(), Some("Apples: 3"));

        app.focused_panel = 2;
        assert_eq!(app.hover_label().as_deref(), Some("Apples: 1 (100.0%)"));
    }

    #[tokio::test]
    async fn reload_returns_to_loading() {
        let mut app = App::new(config(), None);
        app.finish_load(Ok(LoadedData::Sales(vec![sale("Apples", "Fruit")])));
        app.start_load();
        assert!(app.is_loading());
        assert!(app.session().is_none());
    }
}
