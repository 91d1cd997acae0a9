/// Wire types for TheSportsDB league tables.
/// Endpoint: https://www.thesportsdb.com/api/v1/json/3/lookuptable.php?l={league}&s={season}
use serde::Deserialize;
use serde_json::Value;

pub const THESPORTSDB_BASE: &str = "https://www.thesportsdb.com/api/v1/json/3";

#[derive(Deserialize, Default, Debug)]
pub struct TableResponse {
    /// `null` when the league/season pair is unknown.
    pub table: Option<Vec<TableRow>>,
}

/// Numbers arrive as strings ("12") or numbers depending on the endpoint
/// version, so they stay as raw values until mapping.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub int_rank: Option<Value>,
    pub str_team: Option<String>,
    pub int_played: Option<Value>,
    pub int_win: Option<Value>,
    pub int_draw: Option<Value>,
    pub int_loss: Option<Value>,
    pub int_goals_for: Option<Value>,
    pub int_goals_against: Option<Value>,
    pub int_goal_difference: Option<Value>,
    pub int_points: Option<Value>,
}
