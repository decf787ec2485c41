mod fetch;
mod painter;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use dashboard_core::stats::{GROUP_COUNT_NODE, LAST_UPDATE_NODE, RECORD_COUNT_NODE};
use dashboard_core::{load, PanelInfo, Session, Sources};
use ratzilla::event::KeyCode;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

const ACCENT: Color = Color::Cyan;

enum Page {
    Loading,
    Ready(Box<dyn Session>),
    Failed(String),
}

struct WebState {
    page: Page,
    focused: usize,
    hovered: Option<usize>,
    /// Bumped on every reload so that a slower, older load cannot overwrite
    /// a newer one.
    generation: u64,
}

impl WebState {
    const fn new() -> Self {
        Self {
            page: Page::Loading,
            focused: 0,
            hovered: None,
            generation: 0,
        }
    }

    fn session(&self) -> Option<&dyn Session> {
        match &self.page {
            Page::Ready(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    fn focused_container(&self) -> Option<String> {
        let panels = self.session()?.panels();
        panels.get(self.focused).map(|panel| panel.container.clone())
    }

    fn hover_count(&self) -> usize {
        match (self.session(), self.focused_container()) {
            (Some(session), Some(container)) => session.scene().hover_targets(&container).len(),
            _ => 0,
        }
    }

    fn hover_label(&self) -> Option<String> {
        let container = self.focused_container()?;
        let target = self.session()?.scene().hover(&container, self.hovered?)?;
        Some(target.hover.label.clone())
    }

    /// Applies one key press. Returns true when the data should be reloaded.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('r') => return true,
            KeyCode::Left | KeyCode::Right => {
                if let Page::Ready(session) = &mut self.page {
                    if session.step_filter(matches!(code, KeyCode::Right)) {
                        self.hovered = None;
                    }
                }
            }
            KeyCode::Tab => {
                let count = self.session().map_or(0, |session| session.panels().len());
                if count > 0 {
                    self.focused = (self.focused + 1) % count;
                }
                self.hovered = None;
            }
            KeyCode::Down | KeyCode::Up => {
                let count = self.hover_count();
                self.hovered = match (self.hovered, matches!(code, KeyCode::Down)) {
                    _ if count == 0 => None,
                    (None, true) => Some(0),
                    (None, false) => Some(count - 1),
                    (Some(index), true) => Some((index + 1) % count),
                    (Some(index), false) => Some(index.checked_sub(1).unwrap_or(count - 1)),
                };
            }
            _ => {}
        }
        false
    }
}

fn start_load(state: &Rc<RefCell<WebState>>, sources: Sources) {
    let generation = {
        let mut state = state.borrow_mut();
        state.generation += 1;
        state.page = Page::Loading;
        state.hovered = None;
        state.generation
    };
    spawn_local(load_page(state.clone(), sources, generation));
}

async fn load_page(state: Rc<RefCell<WebState>>, sources: Sources, generation: u64) {
    let result = load(&sources, fetch::fetch_bytes).await;
    let mut state = state.borrow_mut();
    if state.generation != generation {
        return;
    }
    state.page = match result {
        Ok(data) => Page::Ready(data.into_session()),
        Err(error) => {
            web_sys::console::error_1(&format!("Failed to load dashboard data: {error}").into());
            Page::Failed(error.to_string())
        }
    };
}

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(WebState::new()));
    let sources = fetch::page_sources();
    start_load(&state, sources.clone());

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        move |event| {
            let reload = state.borrow_mut().handle_key(event.code);
            if reload {
                start_load(&state, sources.clone());
            }
        }
    });

    terminal.draw_web(move |f| {
        let state = state.borrow();
        render(&state, f);
    });

    Ok(())
}

fn render(state: &WebState, f: &mut Frame<'_>) {
    let [header, filter_bar, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(3),
    ])
    .areas(f.area().inner(Margin::new(1, 0)));

    render_header(state, f, header);
    render_filter_bar(state, f, filter_bar);
    match &state.page {
        Page::Loading => {
            let paragraph = Paragraph::new("Loading data...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            f.render_widget(paragraph, body);
        }
        Page::Failed(message) => render_failed(f, body, message),
        Page::Ready(session) => render_panels(state, session.as_ref(), f, body),
    }
    render_footer(state, f, footer);
}

fn render_header(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let title = state
        .session()
        .map_or("Dashboard", |session| session.variant().label());
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let text = |node: &str| {
        state
            .session()
            .and_then(|session| session.scene().text(node).map(str::to_string))
            .unwrap_or_else(|| "-".to_string())
    };
    let line = TextLine::from(vec![
        Span::styled("Records: ", Style::default().fg(Color::Gray)),
        Span::raw(text(RECORD_COUNT_NODE)),
        Span::raw("   "),
        Span::styled("Groups: ", Style::default().fg(Color::Gray)),
        Span::raw(text(GROUP_COUNT_NODE)),
        Span::raw("   "),
        Span::styled("Last update: ", Style::default().fg(Color::Gray)),
        Span::raw(text(LAST_UPDATE_NODE)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_filter_bar(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let Some(session) = state.session() else {
        f.render_widget(block.title("Filter"), area);
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
        .block(block.title(format!("Filter by {}", session.filter_field())))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::raw("|"));
    f.render_widget(tabs, area);
}

fn render_failed(f: &mut Frame<'_>, area: Rect, message: &str) {
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
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title("Data not loaded")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_panels(state: &WebState, session: &dyn Session, f: &mut Frame<'_>, area: Rect) {
    let panels = session.panels();
    let Some((last, rest)) = panels.split_last() else {
        return;
    };
    let (top, bottom) = if rest.is_empty() {
        (Rect::default(), area)
    } else {
        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        (top, bottom)
    };
    let columns = Layout::horizontal(rest.iter().map(|_| Constraint::Ratio(1, rest.len() as u32)))
        .split(top);

    for (index, panel) in rest.iter().enumerate() {
        render_panel(state, session, index, panel, f, columns[index]);
    }
    render_panel(state, session, rest.len(), last, f, bottom);
}

fn render_panel(
    state: &WebState,
    session: &dyn Session,
    index: usize,
    panel: &PanelInfo,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let focused = index == state.focused;
    let block = Block::default()
        .title(panel.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { ACCENT } else { Color::DarkGray }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let scene = session.scene();
    let Some(surface) = scene.surfaces(&panel.container).first() else {
        return;
    };
    let hovered = state
        .hovered
        .filter(|_| focused)
        .and_then(|hover| scene.hover(&panel.container, hover))
        .map(|target| target.mark);

    match &surface.legend {
        Some(legend) if inner.width > 30 => {
            let [chart, legend_area] = Layout::horizontal([
                Constraint::Min(10),
                Constraint::Length(painter::legend_width(legend)),
            ])
            .areas(inner);
            painter::render_surface(f, chart, surface, hovered);
            painter::render_legend(f, legend_area, legend);
        }
        _ => painter::render_surface(f, inner, surface, hovered),
    }
}

fn render_footer(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let keys = TextLine::from(vec![
        Span::styled("←/→", key),
        Span::raw(" filter  "),
        Span::styled("Tab", key),
        Span::raw(" panel  "),
        Span::styled("↑/↓", key),
        Span::raw(" inspect  "),
        Span::styled("r", key),
        Span::raw(" reload"),
    ]);
    let details = state
        .hover_label()
        .unwrap_or_else(|| "Use ↑/↓ to inspect the focused chart".to_string());
    let paragraph = Paragraph::new(Text::from(vec![TextLine::from(details)])).block(
        Block::default()
            .title("Details")
            .title_bottom(keys.right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}
