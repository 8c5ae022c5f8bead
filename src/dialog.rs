//! Creation dialogs: form state, required-field gating, and the request a submit produces.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::api::{
    ADD_ASSIST_PATH, ADD_FIXTURE_PATH, ADD_GOALSCORER_PATH, ADD_PLAYER_PATH, ADD_TEAM_PATH,
};
use crate::geocode::Coordinates;
use crate::model::{Choice, POSITIONS};
use crate::state::LoadPhase;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one open/close cycle of a dialog. Aborting it makes late results inert.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    id: u64,
    aborted: Arc<AtomicBool>,
}

impl FetchTicket {
    pub fn new() -> Self {
        Self {
            id: NEXT_TICKET.fetch_add(1, Ordering::Relaxed),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl Default for FetchTicket {
    fn default() -> Self {
        Self::new()
    }
}

/// Which views must reload after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    Players,
    Teams,
    Fixtures,
    FixtureEvents { fixture_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Teams,
    Players,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Editing,
    Geocoding,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub endpoint: &'static str,
    pub params: Vec<(&'static str, String)>,
    pub refresh: RefreshEvent,
    pub label: &'static str,
}

/// Selector over fetched reference data. `None` selection means nothing picked.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub choices: Vec<Choice>,
    pub selected: Option<usize>,
    pub allow_none: bool,
}

impl Selector {
    pub fn optional() -> Self {
        Self {
            allow_none: true,
            ..Self::default()
        }
    }

    pub fn set_choices(&mut self, choices: Vec<Choice>) {
        let keep = self.selected_choice().map(|c| c.id.clone());
        self.choices = choices;
        self.selected = keep.and_then(|id| self.choices.iter().position(|c| c.id == id));
    }

    pub fn selected_choice(&self) -> Option<&Choice> {
        self.selected.and_then(|idx| self.choices.get(idx))
    }

    pub fn value_id(&self) -> String {
        self.selected_choice().map(|c| c.id.clone()).unwrap_or_default()
    }

    pub fn value_label(&self) -> String {
        self.selected_choice()
            .map(|c| c.label.clone())
            .unwrap_or_default()
    }

    pub fn next(&mut self) {
        if self.choices.is_empty() {
            return;
        }
        self.selected = match self.selected {
            None => Some(0),
            Some(idx) if idx + 1 < self.choices.len() => Some(idx + 1),
            Some(_) if self.allow_none => None,
            Some(_) => Some(0),
        };
    }

    pub fn prev(&mut self) {
        if self.choices.is_empty() {
            return;
        }
        let last = self.choices.len() - 1;
        self.selected = match self.selected {
            None => Some(last),
            Some(0) if self.allow_none => None,
            Some(0) => Some(last),
            Some(idx) => Some(idx - 1),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Select,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerForm {
    pub name: String,
    pub age: String,
    pub position: Option<usize>,
    pub fun_fact: String,
    pub team: Selector,
}

impl PlayerForm {
    const FIELDS: [(&'static str, FieldKind); 5] = [
        ("Name", FieldKind::Text),
        ("Age", FieldKind::Number),
        ("Position", FieldKind::Select),
        ("Fun Fact", FieldKind::Text),
        ("Team", FieldKind::Select),
    ];

    pub fn position_code(&self) -> &'static str {
        self.position.and_then(|idx| POSITIONS.get(idx).copied()).unwrap_or("")
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.position_code().is_empty() {
            missing.push("position");
        }
        if self.team.value_id().is_empty() {
            missing.push("team");
        }
        missing
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamForm {
    pub name: String,
    pub coach: String,
    pub founded: String,
}

impl TeamForm {
    const FIELDS: [(&'static str, FieldKind); 3] = [
        ("Name", FieldKind::Text),
        ("Coach", FieldKind::Text),
        ("Founded", FieldKind::Number),
    ];

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.coach.trim().is_empty() {
            missing.push("coach");
        }
        if self.founded.trim().is_empty() {
            missing.push("founded");
        }
        missing
    }
}

#[derive(Debug, Clone)]
pub struct FixtureForm {
    pub date: String,
    pub home_team: Selector,
    pub away_team: Selector,
    pub home_score: String,
    pub away_score: String,
    pub man_of_the_match: Selector,
    pub postcode: String,
}

impl Default for FixtureForm {
    fn default() -> Self {
        Self {
            date: String::new(),
            home_team: Selector::default(),
            away_team: Selector::default(),
            home_score: String::new(),
            away_score: String::new(),
            man_of_the_match: Selector::optional(),
            postcode: String::new(),
        }
    }
}

impl FixtureForm {
    const FIELDS: [(&'static str, FieldKind); 7] = [
        ("Date (YYYY-MM-DD)", FieldKind::Text),
        ("Home Team", FieldKind::Select),
        ("Away Team", FieldKind::Select),
        ("Home Score", FieldKind::Number),
        ("Away Score", FieldKind::Number),
        ("Man of the Match", FieldKind::Select),
        ("Postcode", FieldKind::Text),
    ];

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if self.home_team.value_label().is_empty() {
            missing.push("home team");
        }
        if self.away_team.value_label().is_empty() {
            missing.push("away team");
        }
        if self.home_score.trim().is_empty() {
            missing.push("home score");
        }
        if self.away_score.trim().is_empty() {
            missing.push("away score");
        }
        missing
    }

    pub fn postcode(&self) -> Option<&str> {
        let trimmed = self.postcode.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }
}

/// Goalscorer and assist dialogs share one shape: pick a player for a fixture.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub fixture_id: String,
    pub player: Selector,
}

#[derive(Debug, Clone)]
pub enum DialogForm {
    Player(PlayerForm),
    Team(TeamForm),
    Fixture(FixtureForm),
    Goalscorer(EventForm),
    Assist(EventForm),
}

#[derive(Debug, Clone)]
pub struct Dialog {
    pub form: DialogForm,
    pub focus: usize,
    pub phase: DialogPhase,
    pub reference: LoadPhase,
    /// Reference fetches still outstanding for this dialog.
    pub pending_references: Vec<ReferenceKind>,
    pub ticket: FetchTicket,
    pub inline_error: Option<String>,
}

impl Dialog {
    pub fn new(form: DialogForm) -> Self {
        Self {
            form,
            focus: 0,
            phase: DialogPhase::Editing,
            reference: LoadPhase::Idle,
            pending_references: Vec::new(),
            ticket: FetchTicket::new(),
            inline_error: None,
        }
    }

    pub fn add_player() -> Self {
        Self::new(DialogForm::Player(PlayerForm::default()))
    }

    pub fn add_team() -> Self {
        Self::new(DialogForm::Team(TeamForm::default()))
    }

    pub fn add_fixture() -> Self {
        Self::new(DialogForm::Fixture(FixtureForm::default()))
    }

    pub fn add_goalscorer(fixture_id: &str) -> Self {
        Self::new(DialogForm::Goalscorer(EventForm {
            fixture_id: fixture_id.to_string(),
            player: Selector::default(),
        }))
    }

    pub fn add_assist(fixture_id: &str) -> Self {
        Self::new(DialogForm::Assist(EventForm {
            fixture_id: fixture_id.to_string(),
            player: Selector::default(),
        }))
    }

    pub fn title(&self) -> &'static str {
        match self.form {
            DialogForm::Player(_) => "Add Player",
            DialogForm::Team(_) => "Add Team",
            DialogForm::Fixture(_) => "Add New Fixture",
            DialogForm::Goalscorer(_) => "Select Goalscorer",
            DialogForm::Assist(_) => "Add Assist",
        }
    }

    /// Reference collections the selectors need, fetched when the dialog opens.
    pub fn references(&self) -> &'static [ReferenceKind] {
        match self.form {
            DialogForm::Player(_) => &[ReferenceKind::Teams],
            DialogForm::Team(_) => &[],
            DialogForm::Fixture(_) => &[ReferenceKind::Teams, ReferenceKind::Players],
            DialogForm::Goalscorer(_) | DialogForm::Assist(_) => &[ReferenceKind::Players],
        }
    }

    /// Marks every reference collection as in flight and returns the kinds to fetch.
    pub fn begin_reference_load(&mut self) -> &'static [ReferenceKind] {
        let refs = self.references();
        self.pending_references = refs.to_vec();
        if !refs.is_empty() {
            self.reference = LoadPhase::Loading;
        }
        refs
    }

    /// Loaded once the last outstanding fetch lands. A failure stays visible.
    pub fn finish_reference(&mut self, kind: ReferenceKind, result: Result<Vec<Choice>, String>) {
        self.pending_references.retain(|pending| *pending != kind);
        match result {
            Ok(choices) => {
                self.set_reference(kind, choices);
                if self.pending_references.is_empty() && self.reference.error().is_none() {
                    self.reference = LoadPhase::Loaded;
                }
            }
            Err(msg) => self.reference = LoadPhase::Failed(msg),
        }
    }

    pub fn fields(&self) -> &'static [(&'static str, FieldKind)] {
        match self.form {
            DialogForm::Player(_) => &PlayerForm::FIELDS,
            DialogForm::Team(_) => &TeamForm::FIELDS,
            DialogForm::Fixture(_) => &FixtureForm::FIELDS,
            DialogForm::Goalscorer(_) | DialogForm::Assist(_) => &[("Player", FieldKind::Select)],
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != DialogPhase::Editing
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        match &self.form {
            DialogForm::Player(form) => form.missing(),
            DialogForm::Team(form) => form.missing(),
            DialogForm::Fixture(form) => form.missing(),
            DialogForm::Goalscorer(form) | DialogForm::Assist(form) => {
                if form.player.value_id().is_empty() {
                    vec!["player"]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.missing_required().is_empty()
    }

    /// Fixture dialogs with a postcode geocode first.
    pub fn pending_postcode(&self) -> Option<String> {
        match &self.form {
            DialogForm::Fixture(form) => form.postcode().map(str::to_string),
            _ => None,
        }
    }

    pub fn submission(&self, coords: Option<Coordinates>) -> Submission {
        match &self.form {
            DialogForm::Player(form) => Submission {
                endpoint: ADD_PLAYER_PATH,
                params: vec![
                    ("name", form.name.trim().to_string()),
                    ("age", form.age.trim().to_string()),
                    ("position", form.position_code().to_string()),
                    ("funFact", form.fun_fact.trim().to_string()),
                    ("teamId", form.team.value_id()),
                ],
                refresh: RefreshEvent::Players,
                label: "player",
            },
            DialogForm::Team(form) => Submission {
                endpoint: ADD_TEAM_PATH,
                params: vec![
                    ("name", form.name.trim().to_string()),
                    ("coach", form.coach.trim().to_string()),
                    ("founded", form.founded.trim().to_string()),
                ],
                refresh: RefreshEvent::Teams,
                label: "team",
            },
            DialogForm::Fixture(form) => {
                let mut params = vec![
                    ("date", form.date.trim().to_string()),
                    ("homeTeam", form.home_team.value_label()),
                    ("awayTeam", form.away_team.value_label()),
                    ("homeScore", form.home_score.trim().to_string()),
                    ("awayScore", form.away_score.trim().to_string()),
                    ("manOfTheMatch", form.man_of_the_match.value_id()),
                ];
                if let Some(coords) = coords {
                    params.push(("latitude", coords.latitude.to_string()));
                    params.push(("longitude", coords.longitude.to_string()));
                }
                Submission {
                    endpoint: ADD_FIXTURE_PATH,
                    params,
                    refresh: RefreshEvent::Fixtures,
                    label: "fixture",
                }
            }
            DialogForm::Goalscorer(form) => Submission {
                endpoint: ADD_GOALSCORER_PATH,
                params: vec![
                    ("fixtureId", form.fixture_id.clone()),
                    ("playerId", form.player.value_id()),
                ],
                refresh: RefreshEvent::FixtureEvents {
                    fixture_id: form.fixture_id.clone(),
                },
                label: "goalscorer",
            },
            DialogForm::Assist(form) => Submission {
                endpoint: ADD_ASSIST_PATH,
                params: vec![
                    ("fixtureId", form.fixture_id.clone()),
                    ("playerId", form.player.value_id()),
                ],
                refresh: RefreshEvent::FixtureEvents {
                    fixture_id: form.fixture_id.clone(),
                },
                label: "assist",
            },
        }
    }

    pub fn set_reference(&mut self, kind: ReferenceKind, choices: Vec<Choice>) {
        match (&mut self.form, kind) {
            (DialogForm::Player(form), ReferenceKind::Teams) => {
                form.team.set_choices(choices);
                if form.team.selected.is_none() && !form.team.choices.is_empty() {
                    form.team.selected = Some(0);
                }
            }
            (DialogForm::Fixture(form), ReferenceKind::Teams) => {
                form.home_team.set_choices(choices.clone());
                form.away_team.set_choices(choices);
            }
            (DialogForm::Fixture(form), ReferenceKind::Players) => {
                form.man_of_the_match.set_choices(choices);
            }
            (DialogForm::Goalscorer(form), ReferenceKind::Players)
            | (DialogForm::Assist(form), ReferenceKind::Players) => {
                form.player.set_choices(choices);
            }
            _ => {}
        }
    }

    pub fn focus_next(&mut self) {
        let total = self.fields().len();
        if total > 0 {
            self.focus = (self.focus + 1) % total;
        }
    }

    pub fn focus_prev(&mut self) {
        let total = self.fields().len();
        if total > 0 {
            self.focus = (self.focus + total - 1) % total;
        }
    }

    pub fn focused_kind(&self) -> Option<FieldKind> {
        self.fields().get(self.focus).map(|(_, kind)| *kind)
    }

    pub fn type_char(&mut self, c: char) {
        if self.is_busy() {
            return;
        }
        let kind = self.focused_kind();
        if kind == Some(FieldKind::Number) && !c.is_ascii_digit() {
            return;
        }
        if let Some(text) = self.focused_text_mut() {
            text.push(c);
            self.inline_error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.is_busy() {
            return;
        }
        if let Some(text) = self.focused_text_mut() {
            text.pop();
            self.inline_error = None;
        }
    }

    pub fn select_next(&mut self) {
        if self.is_busy() {
            return;
        }
        if let Some(position) = self.focused_position_mut() {
            *position = match *position {
                None => Some(0),
                Some(idx) => Some((idx + 1) % POSITIONS.len()),
            };
        } else if let Some(sel) = self.focused_selector_mut() {
            sel.next();
        }
    }

    pub fn select_prev(&mut self) {
        if self.is_busy() {
            return;
        }
        if let Some(position) = self.focused_position_mut() {
            *position = match *position {
                None | Some(0) => Some(POSITIONS.len() - 1),
                Some(idx) => Some(idx - 1),
            };
        } else if let Some(sel) = self.focused_selector_mut() {
            sel.prev();
        }
    }

    /// (label, current value) rows for rendering.
    pub fn field_rows(&self) -> Vec<(&'static str, String)> {
        let fields = self.fields();
        let values: Vec<String> = match &self.form {
            DialogForm::Player(form) => vec![
                form.name.clone(),
                form.age.clone(),
                form.position_code().to_string(),
                form.fun_fact.clone(),
                form.team.value_label(),
            ],
            DialogForm::Team(form) => vec![
                form.name.clone(),
                form.coach.clone(),
                form.founded.clone(),
            ],
            DialogForm::Fixture(form) => vec![
                form.date.clone(),
                form.home_team.value_label(),
                form.away_team.value_label(),
                form.home_score.clone(),
                form.away_score.clone(),
                form.man_of_the_match
                    .selected_choice()
                    .map(|c| c.label.clone())
                    .unwrap_or_else(|| "None".to_string()),
                form.postcode.clone(),
            ],
            DialogForm::Goalscorer(form) | DialogForm::Assist(form) => {
                vec![form.player.value_label()]
            }
        };
        fields
            .iter()
            .zip(values)
            .map(|((label, _), value)| (*label, value))
            .collect()
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match (&mut self.form, self.focus) {
            (DialogForm::Player(form), 0) => Some(&mut form.name),
            (DialogForm::Player(form), 1) => Some(&mut form.age),
            (DialogForm::Player(form), 3) => Some(&mut form.fun_fact),
            (DialogForm::Team(form), 0) => Some(&mut form.name),
            (DialogForm::Team(form), 1) => Some(&mut form.coach),
            (DialogForm::Team(form), 2) => Some(&mut form.founded),
            (DialogForm::Fixture(form), 0) => Some(&mut form.date),
            (DialogForm::Fixture(form), 3) => Some(&mut form.home_score),
            (DialogForm::Fixture(form), 4) => Some(&mut form.away_score),
            (DialogForm::Fixture(form), 6) => Some(&mut form.postcode),
            _ => None,
        }
    }

    fn focused_position_mut(&mut self) -> Option<&mut Option<usize>> {
        match (&mut self.form, self.focus) {
            (DialogForm::Player(form), 2) => Some(&mut form.position),
            _ => None,
        }
    }

    fn focused_selector_mut(&mut self) -> Option<&mut Selector> {
        match (&mut self.form, self.focus) {
            (DialogForm::Player(form), 4) => Some(&mut form.team),
            (DialogForm::Fixture(form), 1) => Some(&mut form.home_team),
            (DialogForm::Fixture(form), 2) => Some(&mut form.away_team),
            (DialogForm::Fixture(form), 5) => Some(&mut form.man_of_the_match),
            (DialogForm::Goalscorer(form), 0) | (DialogForm::Assist(form), 0) => {
                Some(&mut form.player)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(names: &[&str]) -> Vec<Choice> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| Choice {
                id: format!("id{idx}"),
                label: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn player_dialog_preselects_first_team() {
        let mut dialog = Dialog::add_player();
        dialog.set_reference(ReferenceKind::Teams, choices(&["Rovers", "United"]));
        let DialogForm::Player(form) = &dialog.form else {
            panic!("player form");
        };
        assert_eq!(form.team.value_id(), "id0");
    }

    #[test]
    fn number_fields_reject_letters() {
        let mut dialog = Dialog::add_team();
        dialog.focus = 2;
        for c in "19x05".chars() {
            dialog.type_char(c);
        }
        let DialogForm::Team(form) = &dialog.form else {
            panic!("team form");
        };
        assert_eq!(form.founded, "1905");
    }

    #[test]
    fn optional_selector_cycles_through_none() {
        let mut sel = Selector::optional();
        sel.set_choices(choices(&["A", "B"]));
        sel.next();
        sel.next();
        assert_eq!(sel.value_label(), "B");
        sel.next();
        assert!(sel.selected_choice().is_none());
        sel.prev();
        assert_eq!(sel.value_label(), "B");
    }

    #[test]
    fn fixture_submission_appends_coordinates() {
        let mut dialog = Dialog::add_fixture();
        dialog.set_reference(ReferenceKind::Teams, choices(&["A", "B"]));
        if let DialogForm::Fixture(form) = &mut dialog.form {
            form.date = "2025-03-01".to_string();
            form.home_team.selected = Some(0);
            form.away_team.selected = Some(1);
            form.home_score = "2".to_string();
            form.away_score = "1".to_string();
        }
        assert!(dialog.can_submit());
        let sub = dialog.submission(Some(Coordinates {
            latitude: 51.5,
            longitude: -0.12,
        }));
        assert_eq!(sub.endpoint, ADD_FIXTURE_PATH);
        assert!(sub.params.contains(&("homeTeam", "A".to_string())));
        assert!(sub.params.contains(&("manOfTheMatch", String::new())));
        assert!(sub.params.contains(&("latitude", "51.5".to_string())));
        assert!(sub.params.contains(&("longitude", "-0.12".to_string())));
    }

    #[test]
    fn aborted_ticket_stays_aborted_across_clones() {
        let ticket = FetchTicket::new();
        let clone = ticket.clone();
        ticket.abort();
        assert!(clone.is_aborted());
        assert_ne!(ticket.id(), FetchTicket::new().id());
    }
}
