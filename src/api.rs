use reqwest::Url;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{AppConfig, build_api_url};
use crate::error::{ApiError, ApiResult};
use crate::http_client::shared_client;
use crate::model::{Fixture, Player, Team};

pub const PLAYERS_PATH: &str = "/api/player";
pub const ADD_PLAYER_PATH: &str = "/api/player/add";
pub const TEAMS_PATH: &str = "/api/team/getall";
pub const ADD_TEAM_PATH: &str = "/api/team/add";
pub const FIXTURES_PATH: &str = "/api/fixture/getall";
pub const FIXTURE_PATH: &str = "/api/fixture";
pub const ADD_FIXTURE_PATH: &str = "/api/fixture/add";
pub const ADD_GOALSCORER_PATH: &str = "/api/fixture/addgoalscorer";
pub const ADD_ASSIST_PATH: &str = "/api/fixture/addassist";
pub const RECENT_FIXTURES_PATH: &str = "/api/leaderboard/fixtures";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardKind {
    Goals,
    Assists,
    ManOfTheMatch,
}

impl LeaderboardKind {
    pub const ALL: [LeaderboardKind; 3] = [
        LeaderboardKind::Goals,
        LeaderboardKind::Assists,
        LeaderboardKind::ManOfTheMatch,
    ];

    pub fn path(self) -> &'static str {
        match self {
            LeaderboardKind::Goals => "/api/leaderboard/goals",
            LeaderboardKind::Assists => "/api/leaderboard/assists",
            LeaderboardKind::ManOfTheMatch => "/api/leaderboard/motm",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LeaderboardKind::Goals => "Goals",
            LeaderboardKind::Assists => "Assists",
            LeaderboardKind::ManOfTheMatch => "Man of the Match",
        }
    }

    pub fn stat_label(self) -> &'static str {
        match self {
            LeaderboardKind::Goals => "Goals",
            LeaderboardKind::Assists => "Assists",
            LeaderboardKind::ManOfTheMatch => "MOTM",
        }
    }

    pub fn tally(self, player: &Player) -> u32 {
        match self {
            LeaderboardKind::Goals => player.goals,
            LeaderboardKind::Assists => player.assists,
            LeaderboardKind::ManOfTheMatch => player.man_of_the_match,
        }
    }

    /// Board rows in server order, numbered from 1.
    pub fn ranked_lines(self, players: &[Player]) -> Vec<String> {
        players
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                format!(
                    "{}. {}  {}: {}",
                    idx + 1,
                    player.name,
                    self.stat_label(),
                    self.tally(player)
                )
            })
            .collect()
    }
}

/// Raw HTTP transport. Bodies come back as text; status handling lives here.
pub trait Backend: Send + Sync + 'static {
    fn get(&self, url: &str) -> ApiResult<String>;
    fn post(&self, url: &str) -> ApiResult<String>;
}

pub struct HttpBackend {
    client: &'static Client,
}

impl HttpBackend {
    pub fn new(timeout_secs: u64) -> ApiResult<Self> {
        let client =
            shared_client(timeout_secs).map_err(|err| ApiError::Client(format!("{err:#}")))?;
        Ok(Self { client })
    }

    fn finish(url: &str, resp: reqwest::blocking::Response) -> ApiResult<String> {
        let status = resp.status();
        let body = resp.text().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: server_message(&body).unwrap_or(body),
            });
        }
        Ok(body)
    }
}

impl Backend for HttpBackend {
    fn get(&self, url: &str) -> ApiResult<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        Self::finish(url, resp)
    }

    fn post(&self, url: &str) -> ApiResult<String> {
        let resp = self
            .client
            .post(url)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        Self::finish(url, resp)
    }
}

/// Endpoint-level operations against the FC Tracker backend.
pub struct ApiClient<B: Backend> {
    base_url: String,
    backend: B,
}

impl<B: Backend> ApiClient<B> {
    pub fn new(config: &AppConfig, backend: B) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn url(&self, endpoint: &str) -> String {
        build_api_url(&self.base_url, endpoint)
    }

    pub fn players(&self) -> ApiResult<Vec<Player>> {
        let url = self.url(PLAYERS_PATH);
        let body = self.backend.get(&url)?;
        parse_collection(&url, &body, "players")
    }

    pub fn teams(&self) -> ApiResult<Vec<Team>> {
        let url = self.url(TEAMS_PATH);
        let body = self.backend.get(&url)?;
        parse_collection(&url, &body, "teams")
    }

    pub fn fixtures(&self) -> ApiResult<Vec<Fixture>> {
        let url = self.url(FIXTURES_PATH);
        let body = self.backend.get(&url)?;
        parse_collection(&url, &body, "fixtures")
    }

    pub fn recent_fixtures(&self) -> ApiResult<Vec<Fixture>> {
        let url = self.url(RECENT_FIXTURES_PATH);
        let body = self.backend.get(&url)?;
        parse_collection(&url, &body, "fixtures")
    }

    pub fn fixture(&self, id: &str) -> ApiResult<Fixture> {
        let url = with_path_segment(&self.url(FIXTURE_PATH), id.trim())?;
        let body = self.backend.get(&url)?;
        parse_fixture_json(&url, &body)
    }

    pub fn leaderboard(&self, kind: LeaderboardKind) -> ApiResult<Vec<Player>> {
        let url = self.url(kind.path());
        let body = self.backend.get(&url)?;
        parse_collection(&url, &body, "players")
    }

    /// Single POST with the parameters in the query string. An `error` payload fails it.
    pub fn post_form(&self, endpoint: &str, params: &[(&'static str, String)]) -> ApiResult<()> {
        let url = with_query(&self.url(endpoint), params)?;
        let body = self.backend.post(&url)?;
        check_write_response(&url, &body)
    }
}

/// Appends one percent-encoded path segment.
pub fn with_path_segment(url: &str, segment: &str) -> ApiResult<String> {
    let mut parsed = Url::parse(url).map_err(|err| ApiError::Client(format!("bad url {url}: {err}")))?;
    parsed
        .path_segments_mut()
        .map_err(|_| ApiError::Client(format!("url {url} cannot take a path")))?
        .pop_if_empty()
        .push(segment);
    Ok(parsed.to_string())
}

pub fn with_query(url: &str, params: &[(&'static str, String)]) -> ApiResult<String> {
    let mut parsed = Url::parse(url).map_err(|err| ApiError::Client(format!("bad url {url}: {err}")))?;
    if !params.is_empty() {
        parsed
            .query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(parsed.to_string())
}

pub fn parse_collection<T: DeserializeOwned>(url: &str, raw: &str, key: &str) -> ApiResult<Vec<T>> {
    let root = parse_root(url, raw)?;
    match root.get(key) {
        Some(Value::Null) | None => match error_message(&root) {
            Some(msg) => Err(ApiError::Server(msg)),
            None => Ok(Vec::new()),
        },
        Some(items) => serde_json::from_value(items.clone()).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        }),
    }
}

/// `{fixture: {...}}`, or a bare fixture object from older backends.
pub fn parse_fixture_json(url: &str, raw: &str) -> ApiResult<Fixture> {
    let root = parse_root(url, raw)?;
    let node = match root.get("fixture") {
        Some(Value::Null) | None => {
            if let Some(msg) = error_message(&root) {
                return Err(ApiError::Server(msg));
            }
            &root
        }
        Some(node) => node,
    };
    serde_json::from_value(node.clone()).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

pub fn check_write_response(url: &str, raw: &str) -> ApiResult<()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let root = parse_root(url, trimmed)?;
    match error_message(&root) {
        Some(msg) => Err(ApiError::Server(msg)),
        None => Ok(()),
    }
}

fn parse_root(url: &str, raw: &str) -> ApiResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(trimmed).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// The backend always sends `error`, empty on success; sometimes it is an object.
fn error_message(root: &Value) -> Option<String> {
    match root.get("error")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) if !map.is_empty() => Some(Value::Object(map.clone()).to_string()),
        Value::Array(items) if !items.is_empty() => Some(Value::Array(items.clone()).to_string()),
        _ => None,
    }
}

fn server_message(raw: &str) -> Option<String> {
    let root: Value = serde_json::from_str(raw.trim()).ok()?;
    error_message(&root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(name: &str, goals: u32, assists: u32, motm: u32) -> Player {
        Player {
            name: name.to_string(),
            goals,
            assists,
            man_of_the_match: motm,
            ..Player::default()
        }
    }

    #[test]
    fn ranked_lines_number_from_one_with_stat_label() {
        let players = vec![scorer("Kane", 9, 2, 3), scorer("Vardy", 7, 5, 1)];
        assert_eq!(
            LeaderboardKind::Goals.ranked_lines(&players),
            vec!["1. Kane  Goals: 9", "2. Vardy  Goals: 7"]
        );
        assert_eq!(
            LeaderboardKind::Assists.ranked_lines(&players)[1],
            "2. Vardy  Assists: 5"
        );
        assert_eq!(
            LeaderboardKind::ManOfTheMatch.ranked_lines(&players)[0],
            "1. Kane  MOTM: 3"
        );
    }

    #[test]
    fn ranked_lines_of_empty_board_is_empty() {
        assert!(LeaderboardKind::Goals.ranked_lines(&[]).is_empty());
    }

    #[test]
    fn query_is_form_encoded() {
        let url = with_query(
            "http://localhost:8080/api/player/add",
            &[("name", "Jo Bloggs".to_string()), ("funFact", "5'11 & fast".to_string())],
        )
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/player/add?name=Jo+Bloggs&funFact=5%2711+%26+fast"
        );
    }

    #[test]
    fn fixture_id_is_encoded_as_one_segment() {
        let url = with_path_segment("http://localhost:8080/api/fixture", "a b/../c").unwrap();
        assert_eq!(url, "http://localhost:8080/api/fixture/a%20b%2F..%2Fc");

        let plain = with_path_segment("http://localhost:8080/api/fixture/", "abc123").unwrap();
        assert_eq!(plain, "http://localhost:8080/api/fixture/abc123");
    }

    #[test]
    fn empty_params_leave_no_question_mark() {
        let url = with_query("http://localhost:8080/api/player", &[]).unwrap();
        assert_eq!(url, "http://localhost:8080/api/player");
    }

    #[test]
    fn object_error_payload_is_a_failure() {
        let err = check_write_response("u", r#"{"mesage":"error adding fixture","error":{"code":1}}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
    }

    #[test]
    fn empty_error_string_is_success() {
        assert!(check_write_response("u", r#"{"message":"team added","error":""}"#).is_ok());
    }
}
