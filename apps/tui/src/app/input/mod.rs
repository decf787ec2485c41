mod helpers;

use crate::app::state::App;
use crossterm::event::KeyCode;

use helpers::{step_selection, wrap_decrement, wrap_increment};

pub fn handle_input(app: &mut App, key: KeyCode) {
    if handle_help_toggle(app, key) {
        return;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('r') => app.start_load(),
        KeyCode::Left => app.step_filter(false),
        KeyCode::Right => app.step_filter(true),
        KeyCode::Tab => focus_panel(app, true),
        KeyCode::BackTab => focus_panel(app, false),
        KeyCode::Down => app.hovered = step_selection(app.hovered, app.hover_count(), true),
        KeyCode::Up => app.hovered = step_selection(app.hovered, app.hover_count(), false),
        _ => {}
    }
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::F(1) | KeyCode::Char('?')) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

fn focus_panel(app: &mut App, forward: bool) {
    let count = app.panel_count();
    app.focused_panel = if forward {
        wrap_increment(app.focused_panel, count)
    } else {
        wrap_decrement(app.focused_panel, count)
    };
    app.hovered = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use dashboard_core::{LoadedData, SalesRecord, Session, Sources};

    fn loaded_app() -> App {
        let config = AppConfig {
            sources: Sources::Sales {
                data: "data.json".to_string(),
            },
            log_file: None,
            debug: false,
        };
        let mut app = App::new(config, None);
        let records = ["Fruit", "Veg", "Grain"]
            .iter()
            .map(|category| SalesRecord {
                name: format!("{category} box"),
                category: (*category).to_string(),
                value: 2.0,
                date: "2024-01-01".to_string(),
            })
            .collect();
        app.finish_load(Ok(LoadedData::Sales(records)));
        app
    }

    fn filter(app: &App) -> String {
        app.session()
            .map(|session| session.filter().value().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn arrows_cycle_the_filter() {
        let mut app = loaded_app();
        handle_input(&mut app, KeyCode::Right);
        assert_eq!(filter(&app), "Fruit");
        handle_input(&mut app, KeyCode::Left);
        handle_input(&mut app, KeyCode::Left);
        assert_eq!(filter(&app), "Veg");
        assert_eq!(app.session().and_then(Session::stats).map(|s| s.record_count), Some(1));
    }

    #[test]
    fn tab_moves_focus_and_resets_hover() {
        let mut app = loaded_app();
        handle_input(&mut app, KeyCode::Down);
        assert_eq!(app.hovered, Some(0));

        handle_input(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_panel, 1);
        assert_eq!(app.hovered, None);

        handle_input(&mut app, KeyCode::BackTab);
        handle_input(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_panel, 2);
    }

    #[test]
    fn hover_walks_the_bars() {
        let mut app = loaded_app();
        handle_input(&mut app, KeyCode::Up);
        assert_eq!(app.hover_label().as_deref(), Some("Grain box: 2"));
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = loaded_app();
        handle_input(&mut app, KeyCode::F(1));
        handle_input(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        handle_input(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }
}
