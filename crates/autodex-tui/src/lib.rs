// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use autodex_app::{
    AppCommand, AppState, Browser, DetailSource, DetailView, MakeId, Selector, TABLE_COLUMNS,
    Theme, TreeNode, TrimId, ViewKind, YEAR_MAX_DEFAULT, YEAR_MIN_DEFAULT, capped_records,
    grid_cards, parse_year_bound, result_count_text, table_rows, year_options,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Tabs, Wrap,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const GRID_COLUMNS: usize = 3;
const CARD_HEIGHT: u16 = 5;
const FILTER_PANEL_WIDTH: u16 = 36;
const YEAR_INPUT_MAX_CHARS: usize = 4;
const EXPANDED_MARK: &str = "▼";
const COLLAPSED_MARK: &str = "▶";
const LEAF_MARK: &str = "•";

/// Side effects the browser needs from its host: detail fetching and
/// preference persistence.
pub trait AppRuntime: DetailSource {
    fn save_theme(&mut self, theme: Theme) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Results,
    Filters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Make,
    Model,
    Trim,
    Keyword,
    YearMin,
    YearMax,
    UsOnly,
    BodyStyle,
}

impl FilterField {
    const ALL: [Self; 8] = [
        Self::Make,
        Self::Model,
        Self::Trim,
        Self::Keyword,
        Self::YearMin,
        Self::YearMax,
        Self::UsOnly,
        Self::BodyStyle,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Make => "make",
            Self::Model => "model",
            Self::Trim => "trim",
            Self::Keyword => "keyword",
            Self::YearMin => "year from",
            Self::YearMax => "year to",
            Self::UsOnly => "US only",
            Self::BodyStyle => "body",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: Focus,
    filter_field: usize,
    year_min_input: String,
    year_max_input: String,
    cursor: usize,
    detail: Option<DetailView>,
    detail_scroll: u16,
    pending_detail: Option<(MakeId, TrimId)>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn active_field(&self) -> FilterField {
        FilterField::ALL[self.filter_field % FilterField::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    selected_fg: Color,
    selected_bg: Color,
    status: Color,
}

const fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            text: Color::White,
            background: Color::Black,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            status: Color::Yellow,
        },
        Theme::Light => Palette {
            text: Color::Black,
            background: Color::White,
            accent: Color::Blue,
            muted: Color::Gray,
            selected_fg: Color::White,
            selected_bg: Color::Blue,
            status: Color::Magenta,
        },
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    browser: &mut Browser,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    info!(
        records = browser.filtered().len(),
        view = state.view.as_str(),
        theme = state.theme.as_str(),
        "browser started"
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, browser, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        // The loading frame is on screen; fetch before reading more input.
        if view_data.pending_detail.is_some() {
            resolve_pending_detail(state, browser, runtime, &mut view_data, &internal_tx);
            continue;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, browser, runtime, &mut view_data, &internal_tx, key)
                    {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("browser closed");
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    browser: &mut Browser,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.detail.is_some() {
        handle_detail_key(view_data, key);
        return false;
    }

    match view_data.focus {
        Focus::Filters => {
            handle_filter_key(state, browser, view_data, internal_tx, key);
            false
        }
        Focus::Results => handle_results_key(state, browser, runtime, view_data, internal_tx, key),
    }
}

fn handle_detail_key(view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            view_data.detail = None;
            view_data.detail_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => view_data.detail_scroll = 0,
        _ => {}
    }
}

fn handle_results_key<R: AppRuntime>(
    state: &mut AppState,
    browser: &mut Browser,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab => switch_view(state, view_data, AppCommand::NextView),
        KeyCode::BackTab => switch_view(state, view_data, AppCommand::PrevView),
        KeyCode::Char('1') => switch_view(state, view_data, AppCommand::SwitchView(ViewKind::Grid)),
        KeyCode::Char('2') => {
            switch_view(state, view_data, AppCommand::SwitchView(ViewKind::Table));
        }
        KeyCode::Char('3') => switch_view(state, view_data, AppCommand::SwitchView(ViewKind::Tree)),
        KeyCode::Char('t') => toggle_theme(state, runtime, view_data, internal_tx),
        KeyCode::Char('f') | KeyCode::Char('/') => view_data.focus = Focus::Filters,
        KeyCode::Char('j') | KeyCode::Down => {
            let step = if state.view == ViewKind::Grid {
                GRID_COLUMNS as isize
            } else {
                1
            };
            move_cursor(state, browser, view_data, step);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let step = if state.view == ViewKind::Grid {
                GRID_COLUMNS as isize
            } else {
                1
            };
            move_cursor(state, browser, view_data, -step);
        }
        KeyCode::Char('h') | KeyCode::Left => match state.view {
            ViewKind::Grid => move_cursor(state, browser, view_data, -1),
            ViewKind::Tree => collapse_or_climb(browser, view_data),
            ViewKind::Table => {}
        },
        KeyCode::Char('l') | KeyCode::Right => match state.view {
            ViewKind::Grid => move_cursor(state, browser, view_data, 1),
            ViewKind::Tree => expand_selected(state, browser, view_data, internal_tx),
            ViewKind::Table => {}
        },
        KeyCode::Char('g') | KeyCode::Home => view_data.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.cursor = result_len(state.view, browser).saturating_sub(1);
        }
        KeyCode::Enter => activate_selected(state, browser, view_data, internal_tx),
        _ => {}
    }
    false
}

fn switch_view(state: &mut AppState, view_data: &mut ViewData, command: AppCommand) {
    let events = state.dispatch(command);
    if !events.is_empty() {
        view_data.cursor = 0;
        debug!(view = state.view.as_str(), "switched view");
    }
}

fn toggle_theme<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    state.dispatch(AppCommand::ToggleTheme);
    let theme = state.theme.as_str();
    match runtime.save_theme(state.theme) {
        Ok(()) => emit_status(state, view_data, internal_tx, format!("theme {theme}")),
        Err(error) => {
            warn!(theme, error = format!("{error:#}"), "theme preference not saved");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("theme {theme} (not saved: {error:#})"),
            );
        }
    }
}

fn result_len(view: ViewKind, browser: &Browser) -> usize {
    match view {
        ViewKind::Grid | ViewKind::Table => capped_records(view, browser.filtered()).len(),
        ViewKind::Tree => browser.tree().visible_rows().len(),
    }
}

fn move_cursor(state: &AppState, browser: &Browser, view_data: &mut ViewData, delta: isize) {
    let len = result_len(state.view, browser);
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = (view_data.cursor as isize + delta).clamp(0, len as isize - 1);
    view_data.cursor = next as usize;
}

fn activate_selected(
    state: &mut AppState,
    browser: &mut Browser,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match state.view {
        ViewKind::Grid | ViewKind::Table => {
            let target = capped_records(state.view, browser.filtered())
                .get(view_data.cursor)
                .map(|record| (record.make_id.clone(), record.trim_id.clone()));
            if let Some(target) = target {
                request_detail(state, view_data, target);
            }
        }
        ViewKind::Tree => {
            let Some(row) = browser.tree().visible_rows().into_iter().nth(view_data.cursor) else {
                return;
            };
            match row.node {
                TreeNode::Trim(record) => {
                    request_detail(state, view_data, (record.make_id, record.trim_id));
                }
                node => {
                    let Some(path) = node.path() else {
                        return;
                    };
                    if let Err(error) = browser.tree_mut().toggle(&path) {
                        report_error(state, view_data, internal_tx, "tree", &error);
                    }
                }
            }
        }
    }
}

fn expand_selected(
    state: &mut AppState,
    browser: &mut Browser,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let path = browser
        .tree()
        .visible_rows()
        .into_iter()
        .nth(view_data.cursor)
        .and_then(|row| row.node.path());
    if let Some(path) = path
        && let Err(error) = browser.tree_mut().expand(&path)
    {
        report_error(state, view_data, internal_tx, "tree", &error);
    }
}

/// Collapses the selected group, or moves to the enclosing group when the
/// selection is a leaf or already collapsed.
fn collapse_or_climb(browser: &mut Browser, view_data: &mut ViewData) {
    let rows = browser.tree().visible_rows();
    let Some(row) = rows.get(view_data.cursor) else {
        return;
    };
    if row.expanded
        && let Some(path) = row.node.path()
    {
        browser.tree_mut().collapse(&path);
        return;
    }
    if row.depth == 0 {
        return;
    }
    if let Some(parent) = rows[..view_data.cursor]
        .iter()
        .rposition(|candidate| candidate.depth + 1 == row.depth)
    {
        view_data.cursor = parent;
    }
}

fn request_detail(state: &mut AppState, view_data: &mut ViewData, target: (MakeId, TrimId)) {
    debug!(make = %target.0, trim = %target.1, "detail requested");
    view_data.pending_detail = Some(target);
    state.dispatch(AppCommand::BeginLoading);
}

fn resolve_pending_detail<R: AppRuntime>(
    state: &mut AppState,
    browser: &mut Browser,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some((make_id, trim_id)) = view_data.pending_detail.take() else {
        return;
    };
    let result = browser.on_detail_requested(&make_id, &trim_id, runtime);
    state.dispatch(AppCommand::EndLoading);
    match result {
        Ok(detail) => {
            view_data.detail = Some(detail);
            view_data.detail_scroll = 0;
        }
        Err(error) => {
            error!(
                make = %make_id,
                trim = %trim_id,
                error = format!("{error:#}"),
                "detail request failed"
            );
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("specs unavailable: {error:#}"),
            );
        }
    }
}

fn report_error(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    area: &str,
    error: &anyhow::Error,
) {
    warn!(area, error = format!("{error:#}"), "action failed");
    emit_status(state, view_data, internal_tx, format!("{area}: {error:#}"));
}

fn handle_filter_key(
    state: &mut AppState,
    browser: &mut Browser,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let field = view_data.active_field();
    let outcome = match key.code {
        KeyCode::Esc => {
            view_data.focus = Focus::Results;
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            view_data.filter_field = (view_data.filter_field + 1) % FilterField::ALL.len();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.filter_field =
                (view_data.filter_field + FilterField::ALL.len() - 1) % FilterField::ALL.len();
            return;
        }
        KeyCode::Enter => {
            view_data.focus = Focus::Results;
            return;
        }
        KeyCode::Left => step_field(browser, view_data, field, -1),
        KeyCode::Right => step_field(browser, view_data, field, 1),
        KeyCode::Backspace => clear_or_erase(browser, view_data, field),
        KeyCode::Char(ch) => type_into_field(browser, view_data, field, ch),
        _ => return,
    };

    match outcome {
        Ok(FieldOutcome::Changed) => view_data.cursor = 0,
        Ok(FieldOutcome::Unchanged) => {}
        Ok(FieldOutcome::Disabled(placeholder)) => {
            emit_status(state, view_data, internal_tx, placeholder.to_lowercase());
        }
        Err(error) => report_error(state, view_data, internal_tx, "filter", &error),
    }
}

enum FieldOutcome {
    Changed,
    Unchanged,
    Disabled(&'static str),
}

fn step_selector(
    selector: &Selector,
    delta: isize,
) -> std::result::Result<Option<String>, &'static str> {
    if !selector.enabled {
        return Err(selector.placeholder);
    }
    Ok(selector.step(delta))
}

fn step_field(
    browser: &mut Browser,
    view_data: &mut ViewData,
    field: FilterField,
    delta: isize,
) -> Result<FieldOutcome> {
    match field {
        FilterField::Make => match step_selector(&browser.selectors().make, delta) {
            Ok(value) => browser.on_make_selected(value.map(MakeId::from)),
            Err(placeholder) => return Ok(FieldOutcome::Disabled(placeholder)),
        },
        FilterField::Model => match step_selector(&browser.selectors().model, delta) {
            Ok(value) => browser.on_model_selected(value),
            Err(placeholder) => return Ok(FieldOutcome::Disabled(placeholder)),
        },
        FilterField::Trim => match step_selector(&browser.selectors().trim, delta) {
            Ok(value) => browser.on_trim_selected(value.map(TrimId::from)),
            Err(placeholder) => return Ok(FieldOutcome::Disabled(placeholder)),
        },
        FilterField::YearMin => {
            view_data.year_min_input = step_year(&view_data.year_min_input, delta);
            let bound = parse_year_bound(&view_data.year_min_input, YEAR_MIN_DEFAULT);
            browser.update_criteria(|criteria| criteria.year_min = bound)
        }
        FilterField::YearMax => {
            view_data.year_max_input = step_year(&view_data.year_max_input, delta);
            let bound = parse_year_bound(&view_data.year_max_input, YEAR_MAX_DEFAULT);
            browser.update_criteria(|criteria| criteria.year_max = bound)
        }
        FilterField::UsOnly => browser.update_criteria(|criteria| {
            criteria.us_only = !criteria.us_only;
        }),
        FilterField::Keyword | FilterField::BodyStyle => return Ok(FieldOutcome::Unchanged),
    }?;
    Ok(FieldOutcome::Changed)
}

fn clear_or_erase(
    browser: &mut Browser,
    view_data: &mut ViewData,
    field: FilterField,
) -> Result<FieldOutcome> {
    match field {
        FilterField::Make => browser.on_make_selected(None),
        FilterField::Model => browser.on_model_selected(None),
        FilterField::Trim => browser.on_trim_selected(None),
        FilterField::Keyword => browser.update_criteria(|criteria| {
            criteria.keyword.pop();
        }),
        FilterField::YearMin => {
            view_data.year_min_input.pop();
            let bound = parse_year_bound(&view_data.year_min_input, YEAR_MIN_DEFAULT);
            browser.update_criteria(|criteria| criteria.year_min = bound)
        }
        FilterField::YearMax => {
            view_data.year_max_input.pop();
            let bound = parse_year_bound(&view_data.year_max_input, YEAR_MAX_DEFAULT);
            browser.update_criteria(|criteria| criteria.year_max = bound)
        }
        FilterField::UsOnly => browser.update_criteria(|criteria| criteria.us_only = false),
        FilterField::BodyStyle => browser.update_criteria(|criteria| {
            let mut body = criteria.body_style.take().unwrap_or_default();
            body.pop();
            criteria.body_style = (!body.is_empty()).then_some(body);
        }),
    }?;
    Ok(FieldOutcome::Changed)
}

fn type_into_field(
    browser: &mut Browser,
    view_data: &mut ViewData,
    field: FilterField,
    ch: char,
) -> Result<FieldOutcome> {
    match field {
        FilterField::Keyword => browser.update_criteria(|criteria| criteria.keyword.push(ch)),
        FilterField::YearMin | FilterField::YearMax => {
            let (input, default) = if field == FilterField::YearMin {
                (&mut view_data.year_min_input, YEAR_MIN_DEFAULT)
            } else {
                (&mut view_data.year_max_input, YEAR_MAX_DEFAULT)
            };
            if !ch.is_ascii_digit() || input.len() >= YEAR_INPUT_MAX_CHARS {
                return Ok(FieldOutcome::Unchanged);
            }
            input.push(ch);
            let bound = parse_year_bound(input, default);
            browser.update_criteria(|criteria| {
                if field == FilterField::YearMin {
                    criteria.year_min = bound;
                } else {
                    criteria.year_max = bound;
                }
            })
        }
        FilterField::UsOnly if ch == ' ' => {
            browser.update_criteria(|criteria| criteria.us_only = !criteria.us_only)
        }
        FilterField::BodyStyle => browser.update_criteria(|criteria| {
            criteria.body_style.get_or_insert_with(String::new).push(ch);
        }),
        _ => return Ok(FieldOutcome::Unchanged),
    }?;
    Ok(FieldOutcome::Changed)
}

/// Next value of a year input when stepping through `[any, newest..oldest]`.
fn step_year(input: &str, delta: isize) -> String {
    let years = year_options();
    let current = years
        .iter()
        .position(|year| year.to_string() == input.trim())
        .map_or(0, |index| index + 1) as isize;
    let len = years.len() as isize + 1;
    let next = (current + delta).rem_euclid(len) as usize;
    next.checked_sub(1)
        .map(|index| years[index].to_string())
        .unwrap_or_default()
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    browser: &Browser,
    view_data: &ViewData,
) {
    let colors = palette(state.theme);
    frame.render_widget(
        Block::default().style(Style::default().fg(colors.text).bg(colors.background)),
        frame.area(),
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let titles = ViewKind::ALL
        .iter()
        .enumerate()
        .map(|(index, view)| format!("{} {}", index + 1, view.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(format!(
                    "autodex | {}",
                    result_count_text(browser.filtered().len())
                ))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(colors.text))
        .highlight_style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FILTER_PANEL_WIDTH), Constraint::Min(1)])
        .split(layout[1]);
    render_filter_panel(frame, body[0], browser, view_data, colors);

    if browser.filtered().is_empty() {
        let empty = Paragraph::new("no vehicles match the current filters")
            .style(Style::default().fg(colors.muted))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(state.view.label()),
            );
        frame.render_widget(empty, body[1]);
    } else {
        match state.view {
            ViewKind::Grid => render_grid(frame, body[1], browser, view_data, colors),
            ViewKind::Table => render_table(frame, body[1], browser, view_data, colors),
            ViewKind::Tree => render_tree(frame, body[1], browser, view_data, colors),
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(colors.status))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[2]);

    if let Some(detail) = &view_data.detail {
        let area = centered_rect(70, 75, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_detail_text(detail))
            .wrap(Wrap { trim: false })
            .scroll((view_data.detail_scroll, 0))
            .style(Style::default().fg(colors.text).bg(colors.background))
            .block(
                Block::default()
                    .title(detail.title.clone())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colors.accent)),
            );
        frame.render_widget(overlay, area);
    }

    if state.loading {
        let area = centered_rect(40, 15, frame.area());
        frame.render_widget(Clear, area);
        let target = view_data
            .pending_detail
            .as_ref()
            .map_or_else(String::new, |(make_id, _)| format!(" for {make_id}"));
        let loader = Paragraph::new(format!("loading specs{target}..."))
            .style(Style::default().fg(colors.accent).bg(colors.background))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loader, area);
    }

    if view_data.help_visible {
        let area = centered_rect(76, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .style(Style::default().fg(colors.text).bg(colors.background))
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_filter_panel(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    browser: &Browser,
    view_data: &ViewData,
    colors: Palette,
) {
    let focused = view_data.focus == Focus::Filters;
    let lines = FilterField::ALL
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (value, enabled) = filter_field_value(browser, view_data, *field);
            let active = focused && index == view_data.filter_field;
            let marker = if active { "›" } else { " " };
            let style = if active {
                Style::default()
                    .fg(colors.selected_fg)
                    .bg(colors.selected_bg)
            } else if enabled {
                Style::default().fg(colors.text)
            } else {
                Style::default().fg(colors.muted)
            };
            Line::from(vec![
                Span::styled(format!("{marker} {:<10}", field.label()), style),
                Span::styled(format!(" {value}"), style),
            ])
        })
        .collect::<Vec<_>>();

    let border = if focused { colors.accent } else { colors.muted };
    let title = if browser.criteria().is_unfiltered() {
        "filters"
    } else {
        "filters (active)"
    };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(panel, area);
}

fn filter_field_value(
    browser: &Browser,
    view_data: &ViewData,
    field: FilterField,
) -> (String, bool) {
    let selectors = browser.selectors();
    let criteria = browser.criteria();
    let any = || "any".to_owned();
    match field {
        FilterField::Make => (selectors.make.selected_label().to_owned(), selectors.make.enabled),
        FilterField::Model => (
            selectors.model.selected_label().to_owned(),
            selectors.model.enabled,
        ),
        FilterField::Trim => (selectors.trim.selected_label().to_owned(), selectors.trim.enabled),
        FilterField::Keyword if criteria.keyword.is_empty() => (any(), true),
        FilterField::Keyword => (criteria.keyword.clone(), true),
        FilterField::YearMin if view_data.year_min_input.is_empty() => (any(), true),
        FilterField::YearMin => (view_data.year_min_input.clone(), true),
        FilterField::YearMax if view_data.year_max_input.is_empty() => (any(), true),
        FilterField::YearMax => (view_data.year_max_input.clone(), true),
        FilterField::UsOnly => (
            if criteria.us_only { "[x]" } else { "[ ]" }.to_owned(),
            true,
        ),
        FilterField::BodyStyle => (criteria.body_style.clone().unwrap_or_else(any), true),
    }
}

fn render_grid(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    browser: &Browser,
    view_data: &ViewData,
    colors: Palette,
) {
    let cards = grid_cards(browser.filtered());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("grid | first {} results", cards.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible_rows = usize::from((inner.height / CARD_HEIGHT).max(1));
    let first_row = scroll_offset(view_data.cursor / GRID_COLUMNS, visible_rows);
    for slot in 0..visible_rows {
        let y = inner.y + (slot as u16) * CARD_HEIGHT;
        if y + CARD_HEIGHT > inner.y + inner.height {
            break;
        }
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: CARD_HEIGHT,
            });
        for (column, cell_area) in columns.iter().enumerate() {
            let index = (first_row + slot) * GRID_COLUMNS + column;
            let Some(card) = cards.get(index) else {
                return;
            };
            let border = if index == view_data.cursor {
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted)
            };
            let body = Paragraph::new(vec![
                Line::from(Span::styled(
                    card.badge.clone(),
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("{} {}", card.make, card.model)),
                Line::from(Span::styled(
                    card.trim.clone(),
                    Style::default().fg(colors.muted),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).border_style(border));
            frame.render_widget(body, *cell_area);
        }
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    browser: &Browser,
    view_data: &ViewData,
    colors: Palette,
) {
    let rows = table_rows(browser.filtered());
    let header = Row::new(TABLE_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let shown = rows.len();
    let body = rows.into_iter().map(|row| {
        let [make, model, year, trim, action] = row;
        Row::new(vec![
            Cell::from(make),
            Cell::from(model),
            Cell::from(year),
            Cell::from(trim),
            Cell::from(action).style(Style::default().fg(colors.accent)),
        ])
    });
    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(30),
        Constraint::Length(6),
        Constraint::Percentage(30),
        Constraint::Length(7),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .fg(colors.selected_fg)
                .bg(colors.selected_bg),
        )
        .block(
            Block::default()
                .title(format!("list | first {shown} results"))
                .borders(Borders::ALL),
        );
    let mut table_state = TableState::default().with_selected(Some(view_data.cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_tree(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    browser: &Browser,
    view_data: &ViewData,
    colors: Palette,
) {
    let items = browser
        .tree()
        .visible_rows()
        .into_iter()
        .map(|row| {
            let mark = match (&row.node, row.expanded) {
                (TreeNode::Trim(_), _) => LEAF_MARK,
                (_, true) => EXPANDED_MARK,
                (_, false) => COLLAPSED_MARK,
            };
            let style = match row.node {
                TreeNode::Make { .. } => Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
                TreeNode::Model { .. } => Style::default().fg(colors.text),
                TreeNode::Trim(_) => Style::default().fg(colors.muted),
            };
            ListItem::new(format!(
                "{}{mark} {}",
                "  ".repeat(row.depth),
                row.node.label()
            ))
            .style(style)
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(colors.selected_fg)
                .bg(colors.selected_bg),
        )
        .block(Block::default().title("tree").borders(Borders::ALL));
    let mut list_state = ListState::default().with_selected(Some(view_data.cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail_text(detail: &DetailView) -> String {
    if detail.categories.is_empty() {
        return "no specifications recorded for this trim".to_owned();
    }
    detail
        .categories
        .iter()
        .map(|category| {
            let mut lines = vec![category.name.to_owned()];
            lines.extend(
                category
                    .fields
                    .iter()
                    .map(|field| format!("  {}: {}", field.label, field.value)),
            );
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
views: tab/shift+tab cycle | 1 grid | 2 list | 3 tree\n\
nav: j/k up/down | h/l left/right (grid) or collapse/expand (tree) | g/G first/last\n\
nav: enter specs (grid, list, tree leaf) or toggle group (tree)\n\
filters: f or / focus | tab/shift+tab field | left/right change | type to edit | backspace clear | esc done\n\
specs: j/k scroll | esc close\n\
theme: t toggle dark/light"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = if view_data.help_visible {
        ("HELP", "esc close")
    } else if view_data.detail.is_some() {
        ("SPECS", "j/k scroll | esc close")
    } else if view_data.focus == Focus::Filters {
        (
            "FILTER",
            "tab field | left/right change | type edit | backspace clear | esc done",
        )
    } else {
        (
            "BROWSE",
            "tab/1-3 view | j/k/h/l g/G | enter open | f filters | t theme | ? help | q quit",
        )
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

/// First row to draw so `cursor_row` stays within a window of `visible` rows.
fn scroll_offset(cursor_row: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    (cursor_row + 1).saturating_sub(visible)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
