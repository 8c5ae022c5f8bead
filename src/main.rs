use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use fctracker_terminal::api::{ApiClient, HttpBackend, LeaderboardKind};
use fctracker_terminal::config::{AppConfig, MapPanel};
use fctracker_terminal::dialog::{Dialog, DialogPhase, FieldKind};
use fctracker_terminal::model::{Fixture, Player, Team};
use fctracker_terminal::preferences::Preferences;
use fctracker_terminal::provider::{Provider, spawn_provider};
use fctracker_terminal::state::{
    AppState, Delta, ListView, LoadPhase, NAV_BREAKPOINT, NAV_ITEMS, ProviderCommand, Screen,
    apply_delta, screen_label,
};

const NAV_WIDTH: u16 = 18;

struct App {
    state: AppState,
    config: AppConfig,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(
        config: AppConfig,
        preferences: Preferences,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        Self {
            state: AppState::with_preferences(preferences),
            config,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.dismiss_alert();
            }
            return;
        }
        if self.state.dialog.is_some() {
            self.on_dialog_key(key);
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.console_overlay {
            if matches!(key.code, KeyCode::Char('`') | KeyCode::Esc) {
                self.state.console_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.navigate(Screen::Home),
            KeyCode::Char('2') => self.state.navigate(Screen::Fixtures),
            KeyCode::Char('3') => self.state.navigate(Screen::Players),
            KeyCode::Char('4') => self.state.navigate(Screen::Teams),
            KeyCode::Char('m') => self.state.toggle_drawer(),
            KeyCode::Char('t') => self.state.toggle_dark_mode(),
            KeyCode::Char('r') => {
                self.state.load_screen();
                self.state.push_log("[INFO] Reload requested");
            }
            KeyCode::Char('`') => self.state.console_overlay = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {
                if matches!(self.state.screen, Screen::FixtureDetail { .. }) {
                    self.on_detail_key(key);
                } else {
                    self.on_list_key(key);
                }
            }
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.current_list_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.current_list_prev(),
            KeyCode::Char('n') | KeyCode::Right => self.state.current_next_page(),
            KeyCode::Char('p') | KeyCode::Left => self.state.current_prev_page(),
            KeyCode::Char('+') => self.state.current_cycle_rows_per_page(),
            KeyCode::Enter | KeyCode::Char('d') => self.state.open_selected_fixture(),
            KeyCode::Char('a') => self.state.open_add_dialog(),
            _ => {}
        }
    }

    fn on_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('g') => self.state.open_goalscorer_dialog(),
            KeyCode::Char('s') => self.state.open_assist_dialog(),
            KeyCode::Char('e') => self.state.edit_fixture(),
            KeyCode::Char('b') | KeyCode::Esc => self.state.close_fixture(),
            _ => {}
        }
    }

    fn on_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if !self.state.close_dialog() {
                    self.state.push_log("[INFO] Wait for the request to finish");
                }
            }
            KeyCode::Enter => self.state.submit_dialog(),
            _ => {
                let Some(dialog) = self.state.dialog.as_mut() else {
                    return;
                };
                match key.code {
                    KeyCode::Tab | KeyCode::Down => dialog.focus_next(),
                    KeyCode::BackTab | KeyCode::Up => dialog.focus_prev(),
                    KeyCode::Right => dialog.select_next(),
                    KeyCode::Left => dialog.select_prev(),
                    KeyCode::Backspace => dialog.backspace(),
                    KeyCode::Char(c) => dialog.type_char(c),
                    _ => {}
                }
            }
        }
    }

    /// Hands queued commands to the provider thread.
    fn flush_commands(&mut self) {
        for cmd in self.state.take_commands() {
            match &self.cmd_tx {
                Some(tx) => {
                    if tx.send(cmd).is_err() {
                        self.state.push_log("[WARN] Provider stopped, request dropped");
                    }
                }
                None => self.state.push_log("[INFO] Backend unavailable"),
            }
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    let preferences = Preferences::load(config.preferences_path.clone());
    let backend =
        HttpBackend::new(config.http_timeout_secs).context("failed to set up the http backend")?;
    let provider = Provider::new(
        ApiClient::new(&config, backend),
        config.geocoder_base_url.clone(),
    );

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(provider, config.fetch_parallelism, tx, cmd_rx);

    let mut app = App::new(config, preferences, Some(cmd_tx));
    app.state.push_log(format!(
        "[INFO] Using {} backend at {}",
        app.config.environment.label(),
        app.config.api_base_url
    ));
    app.state.navigate(Screen::Home);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.flush_commands();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
    error: Color,
    highlight: Color,
}

fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            bg: Color::Black,
            fg: Color::Gray,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            error: Color::LightRed,
            highlight: Color::DarkGray,
        }
    } else {
        Palette {
            bg: Color::White,
            fg: Color::Black,
            accent: Color::Blue,
            muted: Color::Gray,
            error: Color::Red,
            highlight: Color::LightBlue,
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let pal = palette(state.dark_mode);
    let area = frame.size();
    frame.render_widget(
        Block::default().style(Style::default().bg(pal.bg).fg(pal.fg)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(frame, chunks[0], app, pal);

    let docked = area.width >= NAV_BREAKPOINT;
    let content = if docked {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAV_WIDTH), Constraint::Min(1)])
            .split(chunks[1]);
        render_nav(frame, cols[0], state, pal);
        cols[1]
    } else {
        chunks[1]
    };

    match &state.screen {
        Screen::Home => render_home(frame, content, state, pal),
        Screen::Fixtures => render_fixtures(frame, content, state, pal),
        Screen::Players => render_players(frame, content, state, pal),
        Screen::Teams => render_teams(frame, content, state, pal),
        Screen::FixtureDetail { .. } => render_detail(frame, content, app, pal),
    }

    if !docked && state.drawer_visible(area.width) {
        let overlay = Rect {
            width: NAV_WIDTH.min(chunks[1].width),
            ..chunks[1]
        };
        frame.render_widget(Clear, overlay);
        render_nav(frame, overlay, state, pal);
    }

    render_footer(frame, chunks[2], state, pal);

    if let Some(dialog) = &state.dialog {
        render_dialog(frame, area, dialog, pal);
    }
    if let Some(alert) = &state.alert {
        render_alert(frame, area, alert, pal);
    }
    if state.console_overlay {
        render_console_overlay(frame, area, state, pal);
    }
    if state.help_overlay {
        render_help_overlay(frame, area, pal);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, pal: Palette) {
    let state = &app.state;
    let today = Local::now().format("%-d/%-m/%Y").to_string();
    let mode = if state.dark_mode { "Dark" } else { "Light" };
    let title = Line::from(vec![
        Span::styled(
            "FC Tracker",
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}", screen_label(&state.screen))),
    ]);
    let meta = Line::from(Span::styled(
        format!(
            "{today} | {} | {mode} mode (t)",
            app.config.environment.label()
        ),
        Style::default().fg(pal.muted),
    ));
    let header = Paragraph::new(vec![title, meta]).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_nav(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let active = match &state.screen {
        Screen::FixtureDetail { .. } => state.detail.as_ref().map(|d| d.back.clone()),
        other => Some(other.clone()),
    };
    let lines: Vec<Line> = NAV_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, (screen, label))| {
            let text = format!(" {} {label}", idx + 1);
            if active.as_ref() == Some(screen) {
                Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(pal.accent)
                        .bg(pal.highlight)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(text)
            }
        })
        .collect();
    let nav = Paragraph::new(lines)
        .style(Style::default().bg(pal.bg).fg(pal.fg))
        .block(Block::default().title("Menu").borders(Borders::ALL));
    frame.render_widget(nav, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let hints = match state.screen {
        Screen::Home => "1-4 Screens | j/k Move | n/p Page | + Size | Enter Details | m Menu | ? Help | q Quit",
        Screen::Fixtures => "j/k Move | n/p Page | + Size | Enter Details | a Add Fixture | r Reload | ? Help | q Quit",
        Screen::Players => "j/k Move | n/p Page | + Size | a Add Player | r Reload | ? Help | q Quit",
        Screen::Teams => "j/k Move | n/p Page | + Size | a Add Team | r Reload | ? Help | q Quit",
        Screen::FixtureDetail { .. } => {
            "g Add Goalscorer | s Add Assist | e Edit | b/Esc Back | r Reload | ? Help | q Quit"
        }
    };
    let last = state
        .logs
        .back()
        .cloned()
        .unwrap_or_else(|| "No messages yet".to_string());
    let footer = Paragraph::new(vec![
        Line::from(hints),
        Line::from(Span::styled(last, Style::default().fg(pal.muted))),
    ]);
    frame.render_widget(footer, area);
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    let boards = &state.leaderboard.boards;
    let lists = [&boards.goals, &boards.assists, &boards.motm];
    for ((kind, players), col) in LeaderboardKind::ALL.iter().zip(lists).zip(cols.iter()) {
        let text = leaderboard_text(*kind, players, &state.leaderboard.phase);
        let style = if state.leaderboard.phase.error().is_some() {
            Style::default().fg(pal.error)
        } else {
            Style::default()
        };
        let card = Paragraph::new(text)
            .style(style)
            .block(Block::default().title(kind.title()).borders(Borders::ALL));
        frame.render_widget(card, *col);
    }

    render_fixture_table(
        frame,
        rows[1],
        "Last 5 Fixtures",
        &state.recent_fixtures,
        pal,
    );
}

fn leaderboard_text(kind: LeaderboardKind, players: &[Player], phase: &LoadPhase) -> String {
    match phase {
        LoadPhase::Idle | LoadPhase::Loading => return "Loading...".to_string(),
        LoadPhase::Failed(msg) => return format!("Error: {msg}"),
        LoadPhase::Loaded => {}
    }
    if players.is_empty() {
        return "No players yet".to_string();
    }
    kind.ranked_lines(players).join("\n")
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    render_fixture_table(frame, area, "Fixtures", &state.fixtures, pal);
}

fn render_fixture_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    view: &ListView<Fixture>,
    pal: Palette,
) {
    let rows = view.visible().iter().map(|f| {
        Row::new(vec![
            Cell::from(f.date.clone()),
            Cell::from(f.title()),
            Cell::from(f.score_line()),
            Cell::from(f.man_of_the_match_label().unwrap_or("N/A").to_string()),
        ])
    });
    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Min(16),
    ];
    let header = ["Date", "Teams", "Score", "Man of the Match"];
    render_table(frame, area, title, view, header.to_vec(), rows, &widths, pal);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let view: &ListView<Player> = &state.players;
    let rows = view.visible().iter().map(|p| {
        Row::new(vec![
            Cell::from(p.team_name.clone()),
            Cell::from(p.name.clone()),
            Cell::from(p.position.clone()),
            Cell::from(p.age.clone()),
            Cell::from(p.goals.to_string()),
            Cell::from(p.assists.to_string()),
        ])
    });
    let widths = [
        Constraint::Min(14),
        Constraint::Min(18),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(8),
    ];
    let header = vec!["Team", "Name", "Position", "Age", "Goals", "Assists"];
    render_table(frame, area, "Players", view, header, rows, &widths, pal);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let view: &ListView<Team> = &state.teams;
    let rows = view.visible().iter().map(|t| {
        Row::new(vec![
            Cell::from(t.name.clone()),
            Cell::from(t.coach.clone()),
            Cell::from(t.founded.clone()),
        ])
    });
    let widths = [
        Constraint::Min(18),
        Constraint::Min(18),
        Constraint::Length(8),
    ];
    let header = vec!["Team", "Coach", "Founded"];
    render_table(frame, area, "Teams", view, header, rows, &widths, pal);
}

#[allow(clippy::too_many_arguments)]
fn render_table<'a, T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    view: &ListView<T>,
    header: Vec<&'a str>,
    rows: impl Iterator<Item = Row<'a>>,
    widths: &[Constraint],
    pal: Palette,
) {
    let status = match &view.phase {
        LoadPhase::Loading => Some(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(pal.muted),
        ))),
        LoadPhase::Failed(msg) => Some(Line::from(Span::styled(
            format!("Error: {msg}"),
            Style::default().fg(pal.error),
        ))),
        LoadPhase::Loaded if view.rows.is_empty() => Some(Line::from(Span::styled(
            "Nothing here yet",
            Style::default().fg(pal.muted),
        ))),
        _ => None,
    };

    let block = Block::default()
        .title(title.to_string())
        .title_bottom(
            Line::from(format!(
                " {} | {} per page ",
                view.pager.label(view.rows.len()),
                view.pager.rows_per_page
            ))
            .alignment(Alignment::Right),
        )
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let table_area = match status {
        Some(line) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(inner);
            frame.render_widget(Paragraph::new(line), split[0]);
            split[1]
        }
        None => inner,
    };

    let header = Row::new(header).style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(rows, widths.to_vec())
        .header(header)
        .highlight_style(Style::default().bg(pal.highlight).fg(pal.accent))
        .highlight_symbol("> ");
    let mut table_state = TableState::default();
    if !view.visible().is_empty() {
        table_state.select(Some(view.selected));
    }
    frame.render_stateful_widget(table, table_area, &mut table_state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App, pal: Palette) {
    let Some(detail) = app.state.detail.as_ref() else {
        frame.render_widget(Paragraph::new("No fixture selected"), area);
        return;
    };
    let Some(fixture) = detail.fixture.as_ref() else {
        let text = match &detail.phase {
            LoadPhase::Failed(msg) => Span::styled(
                format!("Error: {msg}"),
                Style::default().fg(pal.error),
            ),
            _ => Span::styled("Loading fixture...", Style::default().fg(pal.muted)),
        };
        let panel = Paragraph::new(Line::from(text))
            .block(Block::default().title("Fixture").borders(Borders::ALL));
        frame.render_widget(panel, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);

    let mut summary = vec![
        Line::from(Span::styled(
            fixture.title(),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Date: {}", fixture.date)),
        Line::from(format!("Score: {}", fixture.score_line())),
        Line::from(format!(
            "Man of the Match: {}",
            fixture.man_of_the_match_label().unwrap_or("N/A")
        )),
    ];
    match &detail.phase {
        LoadPhase::Loading => summary[0].spans.push(Span::styled(
            "  (refreshing)",
            Style::default().fg(pal.muted),
        )),
        LoadPhase::Failed(msg) => summary[0].spans.push(Span::styled(
            format!("  ({msg})"),
            Style::default().fg(pal.error),
        )),
        _ => {}
    }
    frame.render_widget(
        Paragraph::new(summary).block(Block::default().title("Fixture").borders(Borders::ALL)),
        rows[0],
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(cols[0]);

    let lineup = if fixture.lineup_names.is_empty() {
        "No lineup".to_string()
    } else {
        fixture.lineup_names.join("\n")
    };
    frame.render_widget(
        Paragraph::new(lineup).block(Block::default().title("Lineup").borders(Borders::ALL)),
        left[0],
    );
    render_chips(
        frame,
        left[1],
        "Goal Scorers (g)",
        &fixture.goal_scorers_names,
        "No goals",
        pal,
    );
    render_chips(
        frame,
        left[2],
        "Assists (s)",
        &fixture.assist_scorers_names,
        "No assists",
        pal,
    );

    render_map(frame, cols[1], app, fixture, pal);
}

fn render_chips(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    names: &[String],
    empty: &str,
    pal: Palette,
) {
    let line = if names.is_empty() {
        Line::from(Span::styled(empty.to_string(), Style::default().fg(pal.muted)))
    } else {
        let mut spans = Vec::new();
        for name in names {
            spans.push(Span::styled(
                format!(" {name} "),
                Style::default().fg(pal.bg).bg(pal.accent),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };
    let chips = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(chips, area);
}

fn render_map(frame: &mut Frame, area: Rect, app: &App, fixture: &Fixture, pal: Palette) {
    let block = Block::default().title("Location").borders(Borders::ALL);
    let panel = MapPanel::resolve(&app.config.map, fixture);
    if let Some(text) = panel.placeholder() {
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(pal.muted))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }
    let MapPanel::Marker {
        latitude: lat,
        longitude: lon,
        static_url,
    } = panel
    else {
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let span_lon = 40.0;
    let span_lat = 20.0;
    let x_min = (lon - span_lon).clamp(-180.0, 180.0 - 2.0 * span_lon);
    let y_min = (lat - span_lat).clamp(-90.0, 90.0 - 2.0 * span_lat);
    let map_color = pal.muted;
    let marker = Style::default().fg(pal.error).add_modifier(Modifier::BOLD);
    let canvas = Canvas::default()
        .x_bounds([x_min, x_min + 2.0 * span_lon])
        .y_bounds([y_min, y_min + 2.0 * span_lat])
        .paint(move |ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: map_color,
            });
            ctx.layer();
            ctx.print(lon, lat, Span::styled("X", marker));
        });
    frame.render_widget(canvas, split[0]);

    let mut info = vec![Line::from(format!("{lat:.4}, {lon:.4}"))];
    if let Some(url) = static_url {
        info.push(Line::from(Span::styled(url, Style::default().fg(pal.muted))));
    }
    frame.render_widget(Paragraph::new(info), split[1]);
}

fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog, pal: Palette) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    match &dialog.reference {
        LoadPhase::Loading => lines.push(Line::from(Span::styled(
            "Loading options...",
            Style::default().fg(pal.muted),
        ))),
        LoadPhase::Failed(msg) => lines.push(Line::from(Span::styled(
            format!("Could not load options: {msg}"),
            Style::default().fg(pal.error),
        ))),
        _ => {}
    }

    let fields = dialog.fields();
    for (idx, (label, value)) in dialog.field_rows().into_iter().enumerate() {
        let focused = idx == dialog.focus;
        let kind = fields.get(idx).map(|(_, kind)| *kind);
        let shown = match kind {
            Some(FieldKind::Select) => format!("< {value} >"),
            _ if focused => format!("{value}_"),
            _ => value,
        };
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{prefix}{label}: "), style),
            Span::raw(shown),
        ]));
    }

    lines.push(Line::from(""));
    match dialog.phase {
        DialogPhase::Geocoding => lines.push(Line::from(Span::styled(
            "Looking up postcode...",
            Style::default().fg(pal.muted),
        ))),
        DialogPhase::Submitting => lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(pal.muted),
        ))),
        DialogPhase::Editing => {}
    }
    if let Some(err) = &dialog.inline_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(pal.error),
        )));
    }
    let submit_style = if dialog.can_submit() {
        Style::default().fg(pal.accent)
    } else {
        Style::default().fg(pal.muted)
    };
    lines.push(Line::from(vec![
        Span::styled("Enter Submit", submit_style),
        Span::raw(" | Tab Next field | ←/→ Choose | Esc Cancel"),
    ]));

    let popup = Paragraph::new(lines)
        .style(Style::default().bg(pal.bg).fg(pal.fg))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(dialog.title())
                .borders(Borders::ALL),
        );
    frame.render_widget(popup, popup_area);
}

fn render_alert(frame: &mut Frame, area: Rect, alert: &str, pal: Palette) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let text = vec![
        Line::from(alert.to_string()),
        Line::from(""),
        Line::from(Span::styled("Enter to dismiss", Style::default().fg(pal.muted))),
    ];
    let popup = Paragraph::new(text)
        .style(Style::default().bg(pal.bg).fg(pal.fg))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Alert").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_console_overlay(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let popup_area = centered_rect(80, 60, area);
    frame.render_widget(Clear, popup_area);
    let visible = popup_area.height.saturating_sub(2) as usize;
    let start = state.logs.len().saturating_sub(visible);
    let text = if state.logs.is_empty() {
        "No messages yet".to_string()
    } else {
        state
            .logs
            .iter()
            .skip(start)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    };
    let console = Paragraph::new(text)
        .style(Style::default().bg(pal.bg).fg(pal.fg))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, pal: Palette) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FC Tracker - Help",
        "",
        "Global:",
        "  1-4          Home / Fixtures / Players / Teams",
        "  m            Toggle menu",
        "  t            Toggle dark mode",
        "  r            Reload screen",
        "  `            Console",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move",
        "  n/p or ←/→   Page",
        "  +            Rows per page",
        "  Enter        Fixture details",
        "  a            Add",
        "",
        "Fixture:",
        "  g / s        Add goalscorer / assist",
        "  e            Edit",
        "  b / Esc      Back",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default().bg(pal.bg).fg(pal.fg));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
