pub mod classify;
pub mod client;
pub mod livescore;
pub mod merge;
pub mod store;
pub mod thesportsdb;

pub use classify::{Classification, League, MatchView, classify, leagues, team_name};
pub use merge::{MergePolicy, merge};
pub use store::{FsSnapshotStore, MemorySnapshotStore, Snapshot, SnapshotKey, SnapshotStore};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Schedule documents: the Livescore date-feed shape, which is also the
// persisted canonical shape. Unknown upstream fields ride along in `extra`.
// ---------------------------------------------------------------------------

/// One calendar day of stages. The unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "Stages", default, deserialize_with = "livescore::lenient_list")]
    pub stages: Vec<Stage>,
}

impl Schedule {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.stages.iter().map(|s| s.events.len()).sum()
    }
}

/// A competition's slate of events for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(
        rename = "Sid",
        default,
        deserialize_with = "livescore::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "Snm", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "Cid",
        default,
        deserialize_with = "livescore::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub competition_id: Option<String>,
    #[serde(rename = "Events", default, deserialize_with = "livescore::lenient_list")]
    pub events: Vec<Event>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// Key used to merge the same stage across days: `Sid`, else `Cid`.
    pub fn merge_key(&self) -> Option<&str> {
        self.id.as_deref().or(self.competition_id.as_deref())
    }

    /// Identifier shown to consumers: `Cid`, else `Sid`.
    pub fn league_id(&self) -> Option<&str> {
        self.competition_id.as_deref().or(self.id.as_deref())
    }
}

/// One fixture. Scores are absent until the match kicks off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(
        rename = "Eid",
        default,
        deserialize_with = "livescore::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        rename = "T1",
        default,
        deserialize_with = "livescore::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub home_teams: Option<Vec<Team>>,
    #[serde(
        rename = "T2",
        default,
        deserialize_with = "livescore::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub away_teams: Option<Vec<Team>>,
    /// `YYYYMMDDhhmmss` as a number, the way the feed sends it.
    #[serde(
        rename = "Esd",
        default,
        deserialize_with = "livescore::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<i64>,
    #[serde(
        rename = "Eps",
        default,
        deserialize_with = "livescore::lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<MatchStatus>,
    #[serde(
        rename = "Tr1",
        default,
        deserialize_with = "livescore::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub home_score: Option<u32>,
    #[serde(
        rename = "Tr2",
        default,
        deserialize_with = "livescore::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub away_score: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(id: impl Into<String>, status: MatchStatus) -> Self {
        Self {
            id: Some(id.into()),
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_teams(mut self, home: &str, away: &str) -> Self {
        self.home_teams = Some(vec![Team::named(home)]);
        self.away_teams = Some(vec![Team::named(away)]);
        self
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.home_score = Some(home);
        self.away_score = Some(away);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "Nm", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Team {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            extra: Map::new(),
        }
    }
}

/// Match status as sent in `Eps`. Tokens outside the known vocabulary are
/// kept verbatim in `Other` so they survive a store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    NotStarted,
    FullTime,
    Scheduled,
    Cancelled,
    Postponed,
    Awarded,
    Other(String), // "1H", "HT", "2H", "ET", ...
}

impl MatchStatus {
    pub fn from_token(token: &str) -> Self {
        match token {
            "NS" => MatchStatus::NotStarted,
            "FT" => MatchStatus::FullTime,
            "Sched" => MatchStatus::Scheduled,
            "Cancelled" => MatchStatus::Cancelled,
            "Postponed" => MatchStatus::Postponed,
            "Awarded" => MatchStatus::Awarded,
            other => MatchStatus::Other(other.to_owned()),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            MatchStatus::NotStarted => "NS",
            MatchStatus::FullTime => "FT",
            MatchStatus::Scheduled => "Sched",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Awarded => "Awarded",
            MatchStatus::Other(token) => token,
        }
    }

    /// Statuses that are never shown as live.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Other(_))
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(self, MatchStatus::NotStarted | MatchStatus::Scheduled)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(MatchStatus::from_token(&token))
    }
}

// ---------------------------------------------------------------------------
// Standings, reshaped from TheSportsDB league tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: Option<u32>,
    pub team: StandingTeam,
    pub games: Option<u32>,
    pub wins: Option<u32>,
    pub draws: Option<u32>,
    pub losses: Option<u32>,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    pub goal_difference: Option<i32>,
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingTeam {
    pub name: Option<String>,
}
