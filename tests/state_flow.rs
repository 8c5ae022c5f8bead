use fctracker_terminal::api::{ADD_FIXTURE_PATH, ADD_GOALSCORER_PATH, ADD_TEAM_PATH};
use fctracker_terminal::dialog::{
    Dialog, DialogForm, DialogPhase, ReferenceKind, RefreshEvent,
};
use fctracker_terminal::geocode::Coordinates;
use fctracker_terminal::model::{Choice, Fixture, Team};
use fctracker_terminal::state::{
    AppState, Delta, LoadPhase, ProviderCommand, Screen, apply_delta,
};

fn team(name: &str) -> Team {
    Team {
        id: format!("id-{name}"),
        name: name.to_string(),
        coach: "Coach".to_string(),
        founded: "1900".to_string(),
        ..Team::default()
    }
}

fn choices(names: &[&str]) -> Vec<Choice> {
    names
        .iter()
        .map(|name| Choice {
            id: format!("id-{name}"),
            label: name.to_string(),
        })
        .collect()
}

fn type_text(dialog: &mut Dialog, text: &str) {
    for c in text.chars() {
        dialog.type_char(c);
    }
}

fn fill_team(state: &mut AppState, name: &str, coach: &str, founded: &str) {
    let dialog = state.dialog.as_mut().expect("dialog open");
    dialog.focus = 0;
    type_text(dialog, name);
    dialog.focus_next();
    type_text(dialog, coach);
    dialog.focus_next();
    type_text(dialog, founded);
}

fn fixture_dialog_ready(state: &mut AppState, postcode: &str) -> u64 {
    state.open_dialog(Dialog::add_fixture());
    let ticket_id = state.dialog.as_ref().expect("dialog").ticket.id();
    state.take_commands();
    apply_delta(
        state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Teams,
            result: Ok(choices(&["A", "B"])),
        },
    );
    let dialog = state.dialog.as_mut().expect("dialog");
    if let DialogForm::Fixture(form) = &mut dialog.form {
        form.date = "2025-03-01".to_string();
        form.home_team.selected = Some(0);
        form.away_team.selected = Some(1);
        form.home_score = "2".to_string();
        form.away_score = "1".to_string();
        form.postcode = postcode.to_string();
    }
    ticket_id
}

#[test]
fn home_screen_loads_leaderboards_and_recent_fixtures() {
    let mut state = AppState::new();
    state.navigate(Screen::Home);
    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 2);
    assert!(matches!(cmds[0], ProviderCommand::FetchLeaderboards));
    assert!(matches!(cmds[1], ProviderCommand::FetchRecentFixtures));
    assert!(state.leaderboard.phase.is_loading());
}

#[test]
fn failed_refresh_keeps_previous_rows() {
    let mut state = AppState::new();
    state.navigate(Screen::Teams);
    apply_delta(&mut state, Delta::SetTeams(Ok(vec![team("Rovers"), team("United")])));
    assert_eq!(state.teams.phase, LoadPhase::Loaded);

    state.load_teams();
    apply_delta(&mut state, Delta::SetTeams(Err("Could not reach the server".to_string())));
    assert_eq!(state.teams.rows.len(), 2);
    assert_eq!(state.teams.phase.error(), Some("Could not reach the server"));
}

#[test]
fn paging_shows_remaining_rows_on_last_page() {
    let mut state = AppState::new();
    state.navigate(Screen::Teams);
    let teams = (0..7).map(|i| team(&format!("T{i}"))).collect();
    apply_delta(&mut state, Delta::SetTeams(Ok(teams)));
    assert_eq!(state.teams.visible().len(), 5);
    state.current_next_page();
    assert_eq!(state.teams.visible().len(), 2);
    state.current_next_page();
    assert_eq!(state.teams.pager.page, 1);
    assert_eq!(state.teams.visible()[0].name, "T5");
}

#[test]
fn add_team_issues_one_post_and_refreshes_team_list() {
    let mut state = AppState::new();
    state.navigate(Screen::Teams);
    state.take_commands();

    state.open_add_dialog();
    assert!(state.take_commands().is_empty());
    fill_team(&mut state, "Rovers", "Smith", "1905");
    state.submit_dialog();

    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    let ProviderCommand::Submit { ticket, submission } = &cmds[0] else {
        panic!("expected a submit command, got {cmds:?}");
    };
    assert_eq!(submission.endpoint, ADD_TEAM_PATH);
    assert_eq!(
        submission.params,
        vec![
            ("name", "Rovers".to_string()),
            ("coach", "Smith".to_string()),
            ("founded", "1905".to_string()),
        ]
    );
    assert_eq!(state.dialog.as_ref().map(|d| d.phase), Some(DialogPhase::Submitting));

    // A second submit while in flight is ignored, and so is cancel.
    state.submit_dialog();
    assert!(!state.close_dialog());
    assert!(state.take_commands().is_empty());

    apply_delta(
        &mut state,
        Delta::Submitted {
            ticket_id: ticket.id(),
            label: submission.label,
            refresh: submission.refresh.clone(),
            result: Ok(()),
        },
    );
    assert!(state.dialog.is_none());
    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    assert!(matches!(cmds[0], ProviderCommand::FetchTeams));

    apply_delta(&mut state, Delta::SetTeams(Ok(vec![team("Rovers")])));
    assert!(state.teams.rows.iter().any(|t| t.name == "Rovers"));
}

#[test]
fn missing_required_field_issues_no_request() {
    let mut state = AppState::new();
    state.navigate(Screen::Teams);
    state.take_commands();
    state.open_add_dialog();
    fill_team(&mut state, "Rovers", "", "1905");
    state.submit_dialog();

    assert!(state.take_commands().is_empty());
    let dialog = state.dialog.as_ref().expect("dialog stays open");
    assert_eq!(dialog.phase, DialogPhase::Editing);
    assert_eq!(dialog.inline_error.as_deref(), Some("Please fill in: coach"));
}

#[test]
fn failed_submit_keeps_dialog_and_input() {
    let mut state = AppState::new();
    state.navigate(Screen::Teams);
    state.open_add_dialog();
    fill_team(&mut state, "Rovers", "Smith", "1905");
    state.submit_dialog();
    let ticket_id = state.dialog.as_ref().expect("dialog").ticket.id();
    state.take_commands();

    apply_delta(
        &mut state,
        Delta::Submitted {
            ticket_id,
            label: "team",
            refresh: RefreshEvent::Teams,
            result: Err("Server responded with 500 Internal Server Error".to_string()),
        },
    );

    assert_eq!(
        state.alert.as_deref(),
        Some("Error adding team: Server responded with 500 Internal Server Error")
    );
    let dialog = state.dialog.as_ref().expect("dialog stays open");
    assert_eq!(dialog.phase, DialogPhase::Editing);
    let DialogForm::Team(form) = &dialog.form else {
        panic!("team form");
    };
    assert_eq!(form.name, "Rovers");
    assert!(state.take_commands().is_empty());
}

#[test]
fn closing_dialog_aborts_ticket_and_ignores_late_reference() {
    let mut state = AppState::new();
    state.navigate(Screen::Players);
    state.take_commands();
    state.open_add_dialog();

    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    let ProviderCommand::FetchReference { ticket, kind } = &cmds[0] else {
        panic!("expected reference fetch");
    };
    assert_eq!(*kind, ReferenceKind::Teams);

    assert!(state.close_dialog());
    assert!(ticket.is_aborted());

    state.open_dialog(Dialog::add_player());
    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id: ticket.id(),
            kind: ReferenceKind::Teams,
            result: Ok(choices(&["Stale"])),
        },
    );
    let dialog = state.dialog.as_ref().expect("new dialog");
    let DialogForm::Player(form) = &dialog.form else {
        panic!("player form");
    };
    assert!(form.team.choices.is_empty());
    assert_eq!(dialog.reference, LoadPhase::Loading);
}

#[test]
fn postcode_miss_blocks_fixture_submission() {
    let mut state = AppState::new();
    let ticket_id = fixture_dialog_ready(&mut state, "ZZ99 9ZZ");
    state.submit_dialog();

    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    assert!(matches!(&cmds[0], ProviderCommand::Geocode { postcode, .. } if postcode == "ZZ99 9ZZ"));

    apply_delta(
        &mut state,
        Delta::Geocoded {
            ticket_id,
            postcode: "ZZ99 9ZZ".to_string(),
            coords: None,
        },
    );
    assert!(state.take_commands().is_empty());
    let dialog = state.dialog.as_ref().expect("dialog stays open");
    assert_eq!(dialog.inline_error.as_deref(), Some("Could not find that postcode"));
    assert_eq!(dialog.phase, DialogPhase::Editing);
    let DialogForm::Fixture(form) = &dialog.form else {
        panic!("fixture form");
    };
    assert_eq!(form.postcode, "ZZ99 9ZZ");
}

#[test]
fn postcode_hit_appends_coordinates_to_submission() {
    let mut state = AppState::new();
    let ticket_id = fixture_dialog_ready(&mut state, "LE2 7FL");
    state.submit_dialog();
    state.take_commands();

    apply_delta(
        &mut state,
        Delta::Geocoded {
            ticket_id,
            postcode: "LE2 7FL".to_string(),
            coords: Some(Coordinates {
                latitude: 52.6204,
                longitude: -1.1422,
            }),
        },
    );
    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    let ProviderCommand::Submit { submission, .. } = &cmds[0] else {
        panic!("expected submit");
    };
    assert_eq!(submission.endpoint, ADD_FIXTURE_PATH);
    assert!(submission.params.contains(&("latitude", "52.6204".to_string())));
    assert!(submission.params.contains(&("longitude", "-1.1422".to_string())));
}

#[test]
fn fixture_without_postcode_submits_directly() {
    let mut state = AppState::new();
    fixture_dialog_ready(&mut state, "  ");
    state.submit_dialog();
    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    assert!(matches!(cmds[0], ProviderCommand::Submit { .. }));
}

#[test]
fn fixture_detail_loads_and_goalscorer_refreshes_it() {
    let mut state = AppState::new();
    state.navigate(Screen::Fixtures);
    state.take_commands();
    state.open_fixture("abc123".to_string());
    let cmds = state.take_commands();
    assert!(matches!(&cmds[0], ProviderCommand::FetchFixture { id } if id == "abc123"));

    let fixture = Fixture {
        id: "abc123".to_string(),
        home_team: "A".to_string(),
        away_team: "B".to_string(),
        home_score: "2".to_string(),
        away_score: "1".to_string(),
        ..Fixture::default()
    };
    apply_delta(
        &mut state,
        Delta::SetFixture {
            id: "abc123".to_string(),
            result: Ok(fixture),
        },
    );
    let detail = state.detail.as_ref().expect("detail state");
    let shown = detail.fixture.as_ref().expect("fixture loaded");
    assert_eq!(shown.title(), "A vs B");
    assert_eq!(shown.score_line(), "2 - 1");

    state.open_goalscorer_dialog();
    let cmds = state.take_commands();
    assert!(matches!(
        cmds[0],
        ProviderCommand::FetchReference {
            kind: ReferenceKind::Players,
            ..
        }
    ));
    let ticket_id = state.dialog.as_ref().expect("dialog").ticket.id();
    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Players,
            result: Ok(choices(&["Jo"])),
        },
    );
    state.dialog.as_mut().expect("dialog").select_next();
    state.submit_dialog();
    let cmds = state.take_commands();
    let ProviderCommand::Submit { submission, .. } = &cmds[0] else {
        panic!("expected submit");
    };
    assert_eq!(submission.endpoint, ADD_GOALSCORER_PATH);
    assert!(submission.params.contains(&("fixtureId", "abc123".to_string())));
    assert!(submission.params.contains(&("playerId", "id-Jo".to_string())));

    apply_delta(
        &mut state,
        Delta::Submitted {
            ticket_id,
            label: submission.label,
            refresh: submission.refresh.clone(),
            result: Ok(()),
        },
    );
    let cmds = state.take_commands();
    assert_eq!(cmds.len(), 1);
    assert!(matches!(&cmds[0], ProviderCommand::FetchFixture { id } if id == "abc123"));

    state.close_fixture();
    assert_eq!(state.screen, Screen::Fixtures);
}

#[test]
fn stale_fixture_response_is_ignored() {
    let mut state = AppState::new();
    state.open_fixture("new".to_string());
    apply_delta(
        &mut state,
        Delta::SetFixture {
            id: "old".to_string(),
            result: Ok(Fixture::default()),
        },
    );
    let detail = state.detail.as_ref().expect("detail");
    assert!(detail.fixture.is_none());
    assert!(detail.phase.is_loading());
}

#[test]
fn edit_fixture_shows_placeholder_alert() {
    let mut state = AppState::new();
    state.open_fixture("abc123".to_string());
    state.edit_fixture();
    assert_eq!(state.alert.as_deref(), Some("Edit Fixture (not implemented)"));
    state.dismiss_alert();
    assert!(state.alert.is_none());
}

#[test]
fn drawer_docks_at_wide_widths() {
    let mut state = AppState::new();
    assert!(state.drawer_visible(120));
    assert!(!state.drawer_visible(80));
    state.toggle_drawer();
    assert!(state.drawer_visible(80));
    state.navigate(Screen::Players);
    assert!(!state.drawer_visible(80));
}

#[test]
fn logs_are_capped() {
    let mut state = AppState::new();
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
}

#[test]
fn fixture_dialog_stays_loading_until_both_references_land() {
    let mut state = AppState::new();
    state.open_dialog(Dialog::add_fixture());
    let ticket_id = state.dialog.as_ref().expect("dialog").ticket.id();
    assert_eq!(state.take_commands().len(), 2);

    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Teams,
            result: Ok(choices(&["A", "B"])),
        },
    );
    let dialog = state.dialog.as_ref().expect("dialog");
    assert_eq!(dialog.reference, LoadPhase::Loading);
    assert_eq!(dialog.pending_references, vec![ReferenceKind::Players]);

    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Players,
            result: Ok(choices(&["Kane"])),
        },
    );
    let dialog = state.dialog.as_ref().expect("dialog");
    assert_eq!(dialog.reference, LoadPhase::Loaded);
    let DialogForm::Fixture(form) = &dialog.form else {
        panic!("fixture form");
    };
    assert_eq!(form.man_of_the_match.choices.len(), 1);
}

#[test]
fn reference_failure_is_not_cleared_by_later_success() {
    let mut state = AppState::new();
    state.open_dialog(Dialog::add_fixture());
    let ticket_id = state.dialog.as_ref().expect("dialog").ticket.id();
    state.take_commands();

    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Players,
            result: Err("Could not reach the server".to_string()),
        },
    );
    apply_delta(
        &mut state,
        Delta::SetReference {
            ticket_id,
            kind: ReferenceKind::Teams,
            result: Ok(choices(&["A", "B"])),
        },
    );
    let dialog = state.dialog.as_ref().expect("dialog");
    assert_eq!(dialog.reference.error(), Some("Could not reach the server"));
    assert!(dialog.pending_references.is_empty());
}
