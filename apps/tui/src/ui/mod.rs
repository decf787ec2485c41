// UI module for dashboard_tui
// Lays out the header, filter bar, chart panels and status line

pub mod painter;
pub mod widgets;

use crate::app::{App, LoadState};
use dashboard_core::stats::{GROUP_COUNT_NODE, LAST_UPDATE_NODE, RECORD_COUNT_NODE};
use dashboard_core::{PanelInfo, Session};
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};
use widgets::popup::centered_rect;

const ACCENT: Color = Color::Cyan;
const KEY: Color = Color::Yellow;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let [header, filter_bar, body, status, shortcuts] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(f.area().inner(Margin::new(1, 0)));

    render_header(app, f, header);
    render_filter_bar(app, f, filter_bar);
    match &app.load_state {
        LoadState::Loading => render_loading(app, f, body),
        LoadState::Failed(message) => render_failed(f, body, message),
        LoadState::Ready(session) => render_panels(app, session.as_ref(), f, body),
    }
    render_status(app, f, status);
    render_shortcuts(f, shortcuts);

    if app.show_help {
        let area = f.area();
        render_help_popup(f, area);
    }
}

fn render_header(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(format!("== {} ==", app.config.variant().label()))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let text = |node: &str| {
        app.session()
            .and_then(|session| session.scene().text(node).map(str::to_string))
            .unwrap_or_else(|| "-".to_string())
    };
    let group_label = app
        .session()
        .map_or("Groups", |session| group_label(session.filter_field()));

    let stats = TextLine::from(vec![
        Span::styled("Records: ", Style::default().fg(Color::Gray)),
        Span::styled(text(RECORD_COUNT_NODE), Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled(format!("{group_label}: "), Style::default().fg(Color::Gray)),
        Span::styled(text(GROUP_COUNT_NODE), Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled("Last update: ", Style::default().fg(Color::Gray)),
        Span::styled(text(LAST_UPDATE_NODE), Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(stats).block(block), area);
}

fn group_label(field: &str) -> &'static str {
    match field {
        "state" => "States",
        "category" => "Categories",
        _ => "Groups",
    }
}

fn render_filter_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(session) = app.session() else {
        let block = Block::default()
            .title("Filter")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(block, area);
        return;
    };

    let control = session.filter();
    let titles = control
        .options()
        .iter()
        .map(|option| TextLine::from(option.as_str()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(control.selected_index())
        .block(
            Block::default()
                .title(format!("Filter by {}", session.filter_field()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::raw("|"));
    f.render_widget(tabs, area);
}

fn render_loading(app: &App, f: &mut Frame<'_>, area: Rect) {
    let spinner_area = centered_rect(40, 20, area);
    let throbber = Throbber::default()
        .label("Loading data...")
        .style(Style::default().fg(ACCENT))
        .throbber_set(BRAILLE_SIX);
    let mut state = app.throbber.clone();
    f.render_stateful_widget(throbber, spinner_area, &mut state);
}

fn render_failed(f: &mut Frame<'_>, area: Rect, message: &str) {
    let block = Block::default()
        .title("Data not loaded")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let text = Text::from(vec![
        TextLine::from(Span::styled(
            "The dashboard data could not be loaded.",
            Style::default().fg(Color::Red),
        )),
        TextLine::from(""),
        TextLine::from(message.to_string()),
        TextLine::from(""),
        TextLine::from("Press r to try again."),
    ]);
    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// All panels but the last share the top row; the last one gets the full
/// width below.
fn panel_areas(count: usize, area: Rect) -> Vec<Rect> {
    match count {
        0 => Vec::new(),
        1 => vec![area],
        _ => {
            let [top, bottom] =
                Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(area);
            let columns = count - 1;
            let mut areas = Layout::horizontal(
                (0..columns).map(|_| Constraint::Ratio(1, columns as u32)),
            )
            .split(top)
            .to_vec();
            areas.push(bottom);
            areas
        }
    }
}

fn render_panels(app: &App, session: &dyn Session, f: &mut Frame<'_>, area: Rect) {
    let panels = session.panels();
    for (index, (panel, panel_area)) in panels
        .iter()
        .zip(panel_areas(panels.len(), area))
        .enumerate()
    {
        let focused = index == app.focused_panel;
        let hovered = if focused { app.hovered } else { None };
        render_panel(session, panel, focused, hovered, f, panel_area);
    }
}

fn render_panel(
    session: &dyn Session,
    panel: &PanelInfo,
    focused: bool,
    hovered: Option<usize>,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let border = if focused { ACCENT } else { Color::DarkGray };
    let block = Block::default()
        .title(panel.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let scene = session.scene();
    let Some(surface) = scene.surfaces(&panel.container).first() else {
        return;
    };

    // hover indices count hoverable marks only
    let hovered_mark = hovered
        .and_then(|index| scene.hover(&panel.container, index))
        .map(|target| target.mark);

    match &surface.legend {
        Some(legend) if inner.width > 30 => {
            let [chart, legend_area] = Layout::horizontal([
                Constraint::Min(10),
                Constraint::Length(painter::legend_width(legend)),
            ])
            .areas(inner);
            painter::render_surface(f, chart, surface, hovered_mark);
            painter::render_legend(f, legend_area, legend);
        }
        _ => painter::render_surface(f, inner, surface, hovered_mark),
    }
}

fn render_status(app: &App, f: &mut Frame<'_>, area: Rect) {
    let (title, text, color) = match app.hover_label() {
        Some(label) => ("Details", label, Color::White),
        None => ("Status", app.status_message.clone(), Color::Gray),
    };
    let loaded = app
        .loaded_at
        .map(|at| format!(" loaded {} ", at.format("%H:%M:%S")))
        .unwrap_or_default();
    let block = Block::default()
        .title(title)
        .title_bottom(TextLine::from(loaded).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(color))).block(block),
        area,
    );
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(KEY).add_modifier(Modifier::BOLD);
    let line = TextLine::from(vec![
        Span::styled("←/→", key),
        Span::raw(": filter   "),
        Span::styled("Tab", key),
        Span::raw(": panel   "),
        Span::styled("↑/↓", key),
        Span::raw(": inspect   "),
        Span::styled("r", key),
        Span::raw(": reload   "),
        Span::styled("?", key),
        Span::raw(": help   "),
        Span::styled("q", key),
        Span::raw(": quit"),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let key = Style::default().fg(KEY).add_modifier(Modifier::BOLD);
    let entry = |keys: &'static str, text: &'static str| {
        TextLine::from(vec![Span::styled(format!("  {keys:<8}"), key), Span::raw(text)])
    };
    let lines = vec![
        TextLine::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        entry("←/→", "Select the previous / next filter value"),
        entry("Tab", "Focus the next chart panel"),
        entry("S-Tab", "Focus the previous chart panel"),
        entry("↑/↓", "Step through the marks of the focused panel"),
        entry("r", "Reload all data from scratch"),
        entry("?/F1", "Toggle this help"),
        entry("q/Esc", "Quit"),
    ];

    let help = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("== Help ==")
                .title_style(Style::default().fg(KEY).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(KEY)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_panel_spans_the_bottom_row() {
        let areas = panel_areas(3, Rect::new(0, 0, 100, 40));
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].width + areas[1].width, 100);
        assert_eq!(areas[2], Rect::new(0, 20, 100, 20));
    }

    #[test]
    fn group_labels_follow_the_filter_field() {
        assert_eq!(group_label("state"), "States");
        assert_eq!(group_label("category"), "Categories");
        assert_eq!(group_label("region"), "Groups");
    }
}
