use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Position codes offered by the add-player selector.
pub const POSITIONS: &[&str] = &[
    "GK", "RB", "CB", "LB", "RWB", "LWB", "CDM", "CM", "CAM", "RM", "LM", "RW", "LW", "CF", "ST",
];

/// Zero ObjectID the backend writes when no man of the match was picked.
pub const EMPTY_OBJECT_ID: &str = "000000000000000000000000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fun_fact: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub goals: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub assists: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub games_played: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub man_of_the_match: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created: String,
    #[serde(rename = "TeamID", default, deserialize_with = "lenient_string")]
    pub team_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub team_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub coach: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub founded: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fixture {
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub home_team: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub away_team: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub home_score: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub away_score: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub man_of_the_match: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub man_of_the_match_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lineup: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lineup_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub goal_scorers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub goal_scorers_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assist_scorers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assist_scorers_names: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    pub fn score_line(&self) -> String {
        format!("{} - {}", self.home_score, self.away_score)
    }

    pub fn man_of_the_match_label(&self) -> Option<&str> {
        if self.man_of_the_match == EMPTY_OBJECT_ID {
            return None;
        }
        let name = self.man_of_the_match_name.trim();
        if name.is_empty() { None } else { Some(name) }
    }

    /// A stored (0, 0) location is how the backend spells "never geocoded".
    pub fn coordinates(&self) -> Option<Location> {
        self.location
            .filter(|loc| !(loc.latitude == 0.0 && loc.longitude == 0.0))
            .filter(|loc| loc.latitude.is_finite() && loc.longitude.is_finite())
    }
}

/// Reference entry for selector controls (teams, players).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl From<&Team> for Choice {
    fn from(team: &Team) -> Self {
        Choice {
            id: team.id.clone(),
            label: team.name.clone(),
        }
    }
}

impl From<&Player> for Choice {
    fn from(player: &Player) -> Self {
        let label = if player.position.is_empty() {
            player.name.clone()
        } else {
            format!("{} ({})", player.name, player.position)
        };
        Choice {
            id: player.id.clone(),
            label,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse::<u32>().unwrap_or_default(),
        _ => 0,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
