use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use dashboard_core::{Session, Summary};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;

use crate::app::{handle_input, App, LoadState};
use crate::ui;

// Configure event poll timeout (ms)
const EVENT_POLL_TIMEOUT: u64 = 50;

/// Run the application in headless mode (no UI)
pub async fn run_headless(app: &mut App, json: bool) -> Result<()> {
    app.load_now().await;

    let session = match &app.load_state {
        LoadState::Ready(session) => session,
        LoadState::Failed(message) => {
            return Err(color_eyre::eyre::eyre!("Data not loaded: {message}"));
        }
        LoadState::Loading => return Err(color_eyre::eyre::eyre!("Data not loaded")),
    };

    let summary = session.summary();
    if json {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{json}");
    } else {
        print!("{}", render_headless_text(session.as_ref(), &summary));
    }

    Ok(())
}

fn render_headless_text(session: &dyn Session, summary: &Summary) -> String {
    let title = session.variant().label();
    let mut out = String::new();
    out.push_str(&format!("\n{title}\n{}\n", "=".repeat(title.len())));
    out.push_str(&format!("Filter ({}): {}\n", summary.filter_field, summary.filter));
    out.push_str(&format!("Options: {}\n", summary.options.join(", ")));

    if let Some(stats) = &summary.stats {
        out.push_str(&format!("Records: {}\n", stats.record_count));
        out.push_str(&format!("Groups: {}\n", stats.group_count));
        out.push_str(&format!("Last update: {}\n", stats.time_label()));
    }

    for panel in &summary.panels {
        out.push_str(&format!("\n{} ({}): {} marks\n", panel.title, panel.container, panel.marks));
        for detail in &panel.details {
            out.push_str(&format!("- {detail}\n"));
        }
        if !panel.legend.is_empty() {
            out.push_str(&format!("  legend: {}\n", panel.legend.join(" | ")));
        }
    }
    out
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    app.start_load();

    loop {
        app.update();
        app.poll_load().await;

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        tracing::debug!("redraw after resize failed");
                    }
                }
                Ok(_) | Err(_) => {
                    // Ignore non-key events
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use dashboard_core::{LoadedData, SalesRecord, Sources};

    #[test]
    fn headless_text_lists_stats_and_panels() {
        let config = AppConfig {
            sources: Sources::Sales {
                data: "data.json".to_string(),
            },
            log_file: None,
            debug: false,
        };
        let mut app = App::new(config, None);
        app.finish_load(Ok(LoadedData::Sales(vec![SalesRecord {
            name: "Apples".to_string(),
            category: "Fruit".to_string(),
            value: 4.0,
            date: "2024-01-01".to_string(),
        }])));

        let session = app.session().unwrap();
        let text = render_headless_text(session, &session.summary());

        assert!(text.contains("Sales Dashboard"));
        assert!(text.contains("Filter (category): all"));
        assert!(text.contains("Records: 1"));
        assert!(text.contains("Groups: 1"));
        assert!(text.contains("- Apples: 4"));
        assert!(text.contains("legend: Apples"));
    }
}
