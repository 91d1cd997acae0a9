use crate::livescore::{self, LIVESCORE_BASE};
use crate::thesportsdb::{THESPORTSDB_BASE, TableResponse, TableRow};
use crate::{Schedule, StandingRow, StandingTeam};
use chrono::NaiveDate;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Upstream client for the Livescore date feed, TheSportsDB tables and
/// plain JSON fixture feeds.
#[derive(Debug, Clone)]
pub struct ScoresApi {
    client: Client,
    timeout: Duration,
    livescore_base: String,
    sportsdb_base: String,
}

impl Default for ScoresApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("goal2gol/0.1 (schedule collector)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(20),
            livescore_base: LIVESCORE_BASE.to_owned(),
            sportsdb_base: THESPORTSDB_BASE.to_owned(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ScoresApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_livescore_base(mut self, base: impl Into<String>) -> Self {
        self.livescore_base = base.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_sportsdb_base(mut self, base: impl Into<String>) -> Self {
        self.sportsdb_base = base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Fetch the raw schedule for one calendar date.
    ///
    /// A 4xx answer means the feed has nothing for that day and yields an
    /// empty schedule; network, 5xx and decoding failures are errors the
    /// caller decides how to degrade.
    pub async fn fetch_schedule(&self, date: NaiveDate) -> ApiResult<Schedule> {
        let url = format!("{}{}", self.livescore_base, livescore::date_path(date));
        let schedule: Schedule = self.get(&url).await?;
        debug!(
            "fetched {} stages / {} events for {}",
            schedule.stages.len(),
            schedule.event_count(),
            date.format(livescore::DATE_FORMAT)
        );
        Ok(schedule)
    }

    /// Fetch a league table and reshape it into standing rows.
    pub async fn fetch_standings(&self, league_id: u32, season: &str) -> ApiResult<Vec<StandingRow>> {
        let url = format!(
            "{}/lookuptable.php?l={league_id}&s={season}",
            self.sportsdb_base
        );
        let raw: TableResponse = self.get(&url).await?;
        let rows = raw
            .table
            .ok_or_else(|| ApiError::NotFound(format!("no table for league {league_id} season {season}")))?;
        Ok(rows.iter().map(map_table_row).collect())
    }

    /// Fetch an arbitrary JSON document, kept verbatim.
    pub async fn fetch_json(&self, url: &str) -> ApiResult<Value> {
        match self.get::<Value>(url).await? {
            Value::Null => Err(ApiError::NotFound(url.to_owned())),
            value => Ok(value),
        }
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: TheSportsDB wire types → standings rows
// ---------------------------------------------------------------------------

fn map_table_row(row: &TableRow) -> StandingRow {
    StandingRow {
        rank: as_u32(row.int_rank.as_ref()),
        team: StandingTeam {
            name: row.str_team.clone(),
        },
        games: as_u32(row.int_played.as_ref()),
        wins: as_u32(row.int_win.as_ref()),
        draws: as_u32(row.int_draw.as_ref()),
        losses: as_u32(row.int_loss.as_ref()),
        goals_for: as_u32(row.int_goals_for.as_ref()),
        goals_against: as_u32(row.int_goals_against.as_ref()),
        goal_difference: as_i64(row.int_goal_difference.as_ref()).and_then(|n| i32::try_from(n).ok()),
        points: as_u32(row.int_points.as_ref()),
    }
}

fn as_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u32(value: Option<&Value>) -> Option<u32> {
    as_i64(value).and_then(|n| u32::try_from(n).ok())
}
