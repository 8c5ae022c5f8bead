use std::collections::VecDeque;

use crate::dialog::{Dialog, DialogPhase, FetchTicket, RefreshEvent, ReferenceKind, Submission};
use crate::error::ApiError;
use crate::geocode::Coordinates;
use crate::model::{Choice, Fixture, Player, Team};
use crate::pagination::{Pager, page_slice};
use crate::preferences::Preferences;

/// Below this width the navigation drawer only shows when toggled open.
pub const NAV_BREAKPOINT: u16 = 100;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Fixtures,
    Players,
    Teams,
    FixtureDetail { id: String },
}

pub const NAV_ITEMS: [(Screen, &str); 4] = [
    (Screen::Home, "Home"),
    (Screen::Fixtures, "Fixtures"),
    (Screen::Players, "Players"),
    (Screen::Teams, "Teams"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadPhase::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadPhase::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A fetched collection rendered as a client-side paginated table.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub rows: Vec<T>,
    pub phase: LoadPhase,
    pub pager: Pager,
    /// Row index within the current page.
    pub selected: usize,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            phase: LoadPhase::Idle,
            pager: Pager::default(),
            selected: 0,
        }
    }
}

impl<T> ListView<T> {
    pub fn begin_load(&mut self) {
        self.phase = LoadPhase::Loading;
    }

    /// Failures keep whatever rows were already on screen.
    pub fn finish(&mut self, result: Result<Vec<T>, String>) {
        match result {
            Ok(rows) => {
                self.rows = rows;
                self.phase = LoadPhase::Loaded;
                self.pager.clamp(self.rows.len());
                self.clamp_selection();
            }
            Err(msg) => self.phase = LoadPhase::Failed(msg),
        }
    }

    pub fn visible(&self) -> &[T] {
        page_slice(&self.rows, self.pager)
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.visible().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let total = self.visible().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn next_page(&mut self) {
        self.pager.next_page(self.rows.len());
        self.selected = 0;
    }

    pub fn prev_page(&mut self) {
        self.pager.prev_page();
        self.selected = 0;
    }

    pub fn cycle_rows_per_page(&mut self) {
        self.pager.cycle_rows_per_page();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let total = self.visible().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboards {
    pub goals: Vec<Player>,
    pub assists: Vec<Player>,
    pub motm: Vec<Player>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardState {
    pub boards: Leaderboards,
    pub phase: LoadPhase,
}

#[derive(Debug, Clone)]
pub struct DetailState {
    pub fixture_id: String,
    pub fixture: Option<Fixture>,
    pub phase: LoadPhase,
    pub back: Screen,
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchPlayers,
    FetchTeams,
    FetchFixtures,
    FetchRecentFixtures,
    FetchLeaderboards,
    FetchFixture {
        id: String,
    },
    FetchReference {
        ticket: FetchTicket,
        kind: ReferenceKind,
    },
    Geocode {
        ticket: FetchTicket,
        postcode: String,
    },
    Submit {
        ticket: FetchTicket,
        submission: Submission,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetPlayers(Result<Vec<Player>, String>),
    SetTeams(Result<Vec<Team>, String>),
    SetFixtures(Result<Vec<Fixture>, String>),
    SetRecentFixtures(Result<Vec<Fixture>, String>),
    SetLeaderboards(Result<Leaderboards, String>),
    SetFixture {
        id: String,
        result: Result<Fixture, String>,
    },
    SetReference {
        ticket_id: u64,
        kind: ReferenceKind,
        result: Result<Vec<Choice>, String>,
    },
    Geocoded {
        ticket_id: u64,
        postcode: String,
        coords: Option<Coordinates>,
    },
    Submitted {
        ticket_id: u64,
        label: &'static str,
        refresh: RefreshEvent,
        result: Result<(), String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub dark_mode: bool,
    pub drawer_open: bool,
    pub help_overlay: bool,
    pub console_overlay: bool,
    pub players: ListView<Player>,
    pub teams: ListView<Team>,
    pub fixtures: ListView<Fixture>,
    pub recent_fixtures: ListView<Fixture>,
    pub leaderboard: LeaderboardState,
    pub detail: Option<DetailState>,
    pub dialog: Option<Dialog>,
    pub alert: Option<String>,
    pub logs: VecDeque<String>,
    preferences: Preferences,
    outbox: VecDeque<ProviderCommand>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_preferences(Preferences::in_memory())
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            screen: Screen::Home,
            dark_mode: preferences.dark_mode(),
            drawer_open: false,
            help_overlay: false,
            console_overlay: false,
            players: ListView::default(),
            teams: ListView::default(),
            fixtures: ListView::default(),
            recent_fixtures: ListView::default(),
            leaderboard: LeaderboardState::default(),
            detail: None,
            dialog: None,
            alert: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            preferences,
            outbox: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Commands queued since the last call, oldest first.
    pub fn take_commands(&mut self) -> Vec<ProviderCommand> {
        self.outbox.drain(..).collect()
    }

    fn queue(&mut self, cmd: ProviderCommand) {
        self.outbox.push_back(cmd);
    }

    pub fn drawer_visible(&self, width: u16) -> bool {
        width >= NAV_BREAKPOINT || self.drawer_open
    }

    pub fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        if let Err(err) = self.preferences.set_dark_mode(self.dark_mode) {
            self.push_log(format!("[WARN] Could not save dark mode: {err:#}"));
        }
    }

    /// Switches screens and loads what the new screen shows.
    pub fn navigate(&mut self, screen: Screen) {
        if let Screen::FixtureDetail { id } = &screen {
            self.open_fixture(id.clone());
            return;
        }
        self.screen = screen;
        self.detail = None;
        self.drawer_open = false;
        self.load_screen();
    }

    pub fn load_screen(&mut self) {
        match self.screen.clone() {
            Screen::Home => {
                self.load_leaderboards();
                self.load_recent_fixtures();
            }
            Screen::Fixtures => self.load_fixtures(),
            Screen::Players => self.load_players(),
            Screen::Teams => self.load_teams(),
            Screen::FixtureDetail { id } => self.load_fixture(&id),
        }
    }

    pub fn load_players(&mut self) {
        self.players.begin_load();
        self.queue(ProviderCommand::FetchPlayers);
    }

    pub fn load_teams(&mut self) {
        self.teams.begin_load();
        self.queue(ProviderCommand::FetchTeams);
    }

    pub fn load_fixtures(&mut self) {
        self.fixtures.begin_load();
        self.queue(ProviderCommand::FetchFixtures);
    }

    pub fn load_recent_fixtures(&mut self) {
        self.recent_fixtures.begin_load();
        self.queue(ProviderCommand::FetchRecentFixtures);
    }

    pub fn load_leaderboards(&mut self) {
        self.leaderboard.phase = LoadPhase::Loading;
        self.queue(ProviderCommand::FetchLeaderboards);
    }

    fn load_fixture(&mut self, id: &str) {
        if let Some(detail) = self.detail.as_mut().filter(|d| d.fixture_id == id) {
            detail.phase = LoadPhase::Loading;
        }
        self.queue(ProviderCommand::FetchFixture { id: id.to_string() });
    }

    pub fn open_fixture(&mut self, id: String) {
        let back = match &self.screen {
            Screen::FixtureDetail { .. } => self
                .detail
                .as_ref()
                .map(|d| d.back.clone())
                .unwrap_or(Screen::Home),
            other => other.clone(),
        };
        self.detail = Some(DetailState {
            fixture_id: id.clone(),
            fixture: None,
            phase: LoadPhase::Loading,
            back,
        });
        self.screen = Screen::FixtureDetail { id: id.clone() };
        self.queue(ProviderCommand::FetchFixture { id });
    }

    pub fn close_fixture(&mut self) {
        let back = self
            .detail
            .take()
            .map(|d| d.back)
            .unwrap_or(Screen::Home);
        self.navigate(back);
    }

    pub fn edit_fixture(&mut self) {
        self.alert = Some("Edit Fixture (not implemented)".to_string());
    }

    /// The table the current screen lets the user move through.
    pub fn open_selected_fixture(&mut self) {
        let id = match self.screen {
            Screen::Home => self.recent_fixtures.selected_row().map(|f| f.id.clone()),
            Screen::Fixtures => self.fixtures.selected_row().map(|f| f.id.clone()),
            _ => None,
        };
        match id.filter(|id| !id.is_empty()) {
            Some(id) => self.open_fixture(id),
            None => self.push_log("[INFO] No fixture selected"),
        }
    }

    pub fn open_dialog(&mut self, mut dialog: Dialog) {
        if let Some(existing) = self.dialog.take() {
            existing.ticket.abort();
        }
        for kind in dialog.begin_reference_load() {
            self.queue(ProviderCommand::FetchReference {
                ticket: dialog.ticket.clone(),
                kind: *kind,
            });
        }
        self.dialog = Some(dialog);
    }

    /// Opens the creation dialog that belongs to the current screen.
    pub fn open_add_dialog(&mut self) {
        match &self.screen {
            Screen::Players => self.open_dialog(Dialog::add_player()),
            Screen::Teams => self.open_dialog(Dialog::add_team()),
            Screen::Fixtures => self.open_dialog(Dialog::add_fixture()),
            _ => {}
        }
    }

    pub fn open_goalscorer_dialog(&mut self) {
        if let Some(id) = self.detail.as_ref().map(|d| d.fixture_id.clone()) {
            self.open_dialog(Dialog::add_goalscorer(&id));
        }
    }

    pub fn open_assist_dialog(&mut self) {
        if let Some(id) = self.detail.as_ref().map(|d| d.fixture_id.clone()) {
            self.open_dialog(Dialog::add_assist(&id));
        }
    }

    /// A dialog with a request in flight stays open.
    pub fn close_dialog(&mut self) -> bool {
        match self.dialog.as_ref() {
            Some(dialog) if dialog.is_busy() => false,
            Some(_) => {
                if let Some(dialog) = self.dialog.take() {
                    dialog.ticket.abort();
                }
                true
            }
            None => false,
        }
    }

    pub fn submit_dialog(&mut self) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        if dialog.is_busy() {
            return;
        }
        let missing = dialog.missing_required();
        if !missing.is_empty() {
            dialog.inline_error = Some(ApiError::MissingFields(missing).user_message());
            return;
        }
        dialog.inline_error = None;
        let ticket = dialog.ticket.clone();
        let cmd = match dialog.pending_postcode() {
            Some(postcode) => {
                dialog.phase = DialogPhase::Geocoding;
                ProviderCommand::Geocode { ticket, postcode }
            }
            None => {
                dialog.phase = DialogPhase::Submitting;
                ProviderCommand::Submit {
                    ticket,
                    submission: dialog.submission(None),
                }
            }
        };
        self.queue(cmd);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Reloads every loaded view that shows the entity a write touched.
    pub fn notify_refresh(&mut self, event: &RefreshEvent) {
        match event {
            RefreshEvent::Players => {
                if self.players.phase != LoadPhase::Idle {
                    self.load_players();
                }
            }
            RefreshEvent::Teams => {
                if self.teams.phase != LoadPhase::Idle {
                    self.load_teams();
                }
            }
            RefreshEvent::Fixtures => {
                if self.fixtures.phase != LoadPhase::Idle {
                    self.load_fixtures();
                }
                if self.recent_fixtures.phase != LoadPhase::Idle {
                    self.load_recent_fixtures();
                }
            }
            RefreshEvent::FixtureEvents { fixture_id } => {
                let showing = self
                    .detail
                    .as_ref()
                    .is_some_and(|d| &d.fixture_id == fixture_id);
                if showing {
                    self.load_fixture(fixture_id);
                }
            }
        }
    }

    pub fn current_list_next(&mut self) {
        match self.screen {
            Screen::Home => self.recent_fixtures.select_next(),
            Screen::Fixtures => self.fixtures.select_next(),
            Screen::Players => self.players.select_next(),
            Screen::Teams => self.teams.select_next(),
            Screen::FixtureDetail { .. } => {}
        }
    }

    pub fn current_list_prev(&mut self) {
        match self.screen {
            Screen::Home => self.recent_fixtures.select_prev(),
            Screen::Fixtures => self.fixtures.select_prev(),
            Screen::Players => self.players.select_prev(),
            Screen::Teams => self.teams.select_prev(),
            Screen::FixtureDetail { .. } => {}
        }
    }

    pub fn current_next_page(&mut self) {
        match self.screen {
            Screen::Home => self.recent_fixtures.next_page(),
            Screen::Fixtures => self.fixtures.next_page(),
            Screen::Players => self.players.next_page(),
            Screen::Teams => self.teams.next_page(),
            Screen::FixtureDetail { .. } => {}
        }
    }

    pub fn current_prev_page(&mut self) {
        match self.screen {
            Screen::Home => self.recent_fixtures.prev_page(),
            Screen::Fixtures => self.fixtures.prev_page(),
            Screen::Players => self.players.prev_page(),
            Screen::Teams => self.teams.prev_page(),
            Screen::FixtureDetail { .. } => {}
        }
    }

    pub fn current_cycle_rows_per_page(&mut self) {
        match self.screen {
            Screen::Home => self.recent_fixtures.cycle_rows_per_page(),
            Screen::Fixtures => self.fixtures.cycle_rows_per_page(),
            Screen::Players => self.players.cycle_rows_per_page(),
            Screen::Teams => self.teams.cycle_rows_per_page(),
            Screen::FixtureDetail { .. } => {}
        }
    }

    fn dialog_for(&mut self, ticket_id: u64) -> Option<&mut Dialog> {
        self.dialog.as_mut().filter(|d| d.ticket.id() == ticket_id)
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetPlayers(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Players fetch failed: {msg}"));
            }
            state.players.finish(result);
        }
        Delta::SetTeams(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Teams fetch failed: {msg}"));
            }
            state.teams.finish(result);
        }
        Delta::SetFixtures(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Fixtures fetch failed: {msg}"));
            }
            state.fixtures.finish(result);
        }
        Delta::SetRecentFixtures(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Recent fixtures fetch failed: {msg}"));
            }
            state.recent_fixtures.finish(result);
        }
        Delta::SetLeaderboards(result) => match result {
            Ok(boards) => {
                state.leaderboard.boards = boards;
                state.leaderboard.phase = LoadPhase::Loaded;
            }
            Err(msg) => {
                state.push_log(format!("[WARN] Leaderboard fetch failed: {msg}"));
                state.leaderboard.phase = LoadPhase::Failed(msg);
            }
        },
        Delta::SetFixture { id, result } => {
            let Some(detail) = state.detail.as_mut().filter(|d| d.fixture_id == id) else {
                return;
            };
            match result {
                Ok(fixture) => {
                    detail.fixture = Some(fixture);
                    detail.phase = LoadPhase::Loaded;
                }
                Err(msg) => {
                    detail.phase = LoadPhase::Failed(msg.clone());
                    state.push_log(format!("[WARN] Fixture {id} fetch failed: {msg}"));
                }
            }
        }
        Delta::SetReference {
            ticket_id,
            kind,
            result,
        } => {
            let Some(dialog) = state.dialog_for(ticket_id) else {
                return;
            };
            let failure = result.as_ref().err().cloned();
            dialog.finish_reference(kind, result);
            if let Some(msg) = failure {
                state.push_log(format!("[WARN] Dropdown data failed: {msg}"));
            }
        }
        Delta::Geocoded {
            ticket_id,
            postcode,
            coords,
        } => {
            let Some(dialog) = state.dialog_for(ticket_id) else {
                return;
            };
            match coords {
                Some(coords) => {
                    dialog.phase = DialogPhase::Submitting;
                    let cmd = ProviderCommand::Submit {
                        ticket: dialog.ticket.clone(),
                        submission: dialog.submission(Some(coords)),
                    };
                    state.queue(cmd);
                }
                None => {
                    dialog.phase = DialogPhase::Editing;
                    dialog.inline_error =
                        Some(ApiError::PostcodeNotFound(postcode.clone()).user_message());
                    state.push_log(format!("[WARN] Postcode lookup missed: {postcode}"));
                }
            }
        }
        Delta::Submitted {
            ticket_id,
            label,
            refresh,
            result,
        } => match result {
            Ok(()) => {
                if state.dialog_for(ticket_id).is_some() {
                    state.dialog = None;
                }
                state.push_log(format!("[INFO] Added {label}"));
                state.notify_refresh(&refresh);
            }
            Err(msg) => {
                if let Some(dialog) = state.dialog_for(ticket_id) {
                    dialog.phase = DialogPhase::Editing;
                }
                state.push_log(format!("[WARN] Adding {label} failed: {msg}"));
                state.alert = Some(format!("Error adding {label}: {msg}"));
            }
        },
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn screen_label(screen: &Screen) -> &'static str {
    match screen {
        Screen::Home => "Dashboard",
        Screen::Fixtures => "Fixtures",
        Screen::Players => "Players",
        Screen::Teams => "Teams",
        Screen::FixtureDetail { .. } => "Fixture",
    }
}
