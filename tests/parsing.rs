use std::fs;
use std::path::PathBuf;

use fctracker_terminal::api::{check_write_response, parse_collection, parse_fixture_json};
use fctracker_terminal::error::ApiError;
use fctracker_terminal::geocode::parse_postcode_json;
use fctracker_terminal::model::{EMPTY_OBJECT_ID, Fixture, Player, Team};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_players_with_mixed_number_encodings() {
    let raw = read_fixture("players.json");
    let players: Vec<Player> = parse_collection("u", &raw, "players").expect("players parse");
    assert_eq!(players.len(), 3);

    let vardy = &players[0];
    assert_eq!(vardy.name, "Jamie Vardy");
    assert_eq!(vardy.team_name, "Rovers");
    assert_eq!(vardy.goals, 12);
    assert_eq!(vardy.man_of_the_match, 4);

    let kerr = &players[1];
    assert_eq!(kerr.age, "30");
    assert_eq!(kerr.goals, 9);

    let keeper = &players[2];
    assert_eq!(keeper.games_played, 0);
    assert!(keeper.fun_fact.is_empty());
    assert!(!keeper.active);
}

#[test]
fn parses_teams_with_null_player_list() {
    let raw = read_fixture("teams.json");
    let teams: Vec<Team> = parse_collection("u", &raw, "teams").expect("teams parse");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].name, "Rovers");
    assert_eq!(teams[0].players.len(), 2);
    assert_eq!(teams[1].founded, "1878");
    assert!(teams[1].players.is_empty());
}

#[test]
fn parses_fixtures_and_reads_locations() {
    let raw = read_fixture("fixtures.json");
    let fixtures: Vec<Fixture> = parse_collection("u", &raw, "fixtures").expect("fixtures parse");
    assert_eq!(fixtures.len(), 2);

    let first = &fixtures[0];
    assert_eq!(first.title(), "Rovers vs United");
    assert_eq!(first.score_line(), "2 - 1");
    assert_eq!(first.man_of_the_match_label(), Some("Jamie Vardy"));
    assert_eq!(first.goal_scorers_names.len(), 2);
    assert!(first.assist_scorers_names.is_empty());
    let loc = first.coordinates().expect("first fixture has a location");
    assert!((loc.latitude - 52.6204).abs() < 1e-9);

    let second = &fixtures[1];
    assert_eq!(second.score_line(), "0 - 0");
    assert_eq!(second.man_of_the_match, EMPTY_OBJECT_ID);
    assert_eq!(second.man_of_the_match_label(), None);
    assert!(second.coordinates().is_none());
}

#[test]
fn fixture_detail_renders_title_and_score() {
    let raw = read_fixture("fixture_abc123.json");
    let fixture = parse_fixture_json("u", &raw).expect("fixture parse");
    assert_eq!(fixture.id, "abc123");
    assert_eq!(fixture.title(), "A vs B");
    assert_eq!(fixture.score_line(), "2 - 1");
    assert_eq!(fixture.lineup_names, vec!["Jo Bloggs", "Sam Kerr"]);
    assert!(fixture.coordinates().is_none());
}

#[test]
fn bare_fixture_object_is_accepted() {
    let raw = r#"{"ID":"x1","HomeTeam":"C","AwayTeam":"D","HomeScore":1,"AwayScore":3}"#;
    let fixture = parse_fixture_json("u", raw).expect("bare fixture parse");
    assert_eq!(fixture.title(), "C vs D");
    assert_eq!(fixture.score_line(), "1 - 3");
}

#[test]
fn missing_collection_with_error_is_a_server_error() {
    let raw = read_fixture("no_players.json");
    let err = parse_collection::<Player>("u", &raw, "players").unwrap_err();
    match err {
        ApiError::Server(msg) => assert_eq!(msg, "no players found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_collection_without_error_is_empty() {
    let rows: Vec<Team> = parse_collection("u", r#"{"error":""}"#, "teams").expect("empty parse");
    assert!(rows.is_empty());
}

#[test]
fn malformed_json_is_a_decode_error() {
    let err = parse_collection::<Team>("http://x/api/team/getall", "{not json", "teams").unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.user_message(), "Server sent an unreadable response");
}

#[test]
fn write_response_error_string_fails() {
    let err = check_write_response("u", r#"{"message":"","error":"team exists"}"#).unwrap_err();
    assert_eq!(err.user_message(), "team exists");
    assert!(check_write_response("u", "").is_ok());
}

#[test]
fn postcode_hit_reads_coordinates() {
    let raw = read_fixture("postcode_hit.json");
    let coords = parse_postcode_json(&raw).expect("postcode should resolve");
    assert!((coords.longitude + 1.1422).abs() < 1e-9);
}
