use std::collections::HashSet;

use serde::Serialize;

use crate::{Event, MatchStatus, Schedule, Stage, Team};

pub const TEAM_PLACEHOLDER: &str = "N/A";
pub const UNKNOWN_LEAGUE: &str = "Unknown League";

/// One event flattened together with its owning stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub league_name: String,
    pub league_id: Option<String>,
    pub home_team_name: String,
    pub away_team_name: String,
    pub match_time: Option<i64>,
    pub match_status: Option<MatchStatus>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub match_id: Option<String>,
}

impl MatchView {
    fn project(stage: &Stage, event: &Event) -> Self {
        Self {
            league_name: stage.name.clone().unwrap_or_else(|| UNKNOWN_LEAGUE.to_owned()),
            league_id: stage.league_id().map(str::to_owned),
            home_team_name: team_name(event.home_teams.as_deref()).to_owned(),
            away_team_name: team_name(event.away_teams.as_deref()).to_owned(),
            match_time: event.start_time,
            match_status: event.status.clone(),
            home_score: event.home_score,
            away_score: event.away_score,
            match_id: event.id.clone(),
        }
    }

    /// Anything outside the terminal vocabulary is live, including unknown
    /// tokens and a missing status.
    pub fn is_live(&self) -> bool {
        self.match_status.as_ref().is_none_or(|s| !s.is_terminal())
    }

    pub fn is_upcoming(&self) -> bool {
        self.match_status.as_ref().is_some_and(MatchStatus::is_upcoming)
    }

    pub fn status_label(&self) -> &str {
        self.match_status.as_ref().map(MatchStatus::token).unwrap_or("?")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub live: Vec<MatchView>,
    pub upcoming: Vec<MatchView>,
    pub all: Vec<MatchView>,
}

/// Name of the first team on one side, or the placeholder.
pub fn team_name(side: Option<&[Team]>) -> &str {
    side.and_then(|teams| teams.first())
        .and_then(|team| team.name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or(TEAM_PLACEHOLDER)
}

/// Live / upcoming / all projection shared by the API, the bot and `show`.
pub fn classify(schedule: &Schedule) -> Classification {
    let all: Vec<MatchView> = schedule
        .stages
        .iter()
        .flat_map(|stage| stage.events.iter().map(move |event| MatchView::project(stage, event)))
        .collect();
    let live = all.iter().filter(|m| m.is_live()).cloned().collect();
    let upcoming = all.iter().filter(|m| m.is_upcoming()).cloned().collect();
    Classification { live, upcoming, all }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub league_name: String,
    pub league_id: Option<String>,
}

/// Distinct leagues in document order, keyed by league id.
pub fn leagues(schedule: &Schedule) -> Vec<League> {
    let mut seen = HashSet::new();
    schedule
        .stages
        .iter()
        .filter(|stage| seen.insert(stage.league_id()))
        .map(|stage| League {
            league_name: stage.name.clone().unwrap_or_else(|| UNKNOWN_LEAGUE.to_owned()),
            league_id: stage.league_id().map(str::to_owned),
        })
        .collect()
}
