use crate::feeds::FeedKind;
use crate::server::AppState;
use crate::server::error::ServerError;
use axum::Json;
use axum::extract::{Path, State};
use livescore_api::{Classification, League, Snapshot, classify, leagues};
use serde_json::{Value, json};

const NOT_READY: &str = "Daily match data not ready.";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Goal2GolScoresandFixtures API!" }))
}

/// Store reads touch the disk and parse whole documents, so they run on the
/// blocking pool instead of a runtime worker.
async fn off_runtime<T, F>(state: &AppState, read: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(AppState) -> Result<T, ServerError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || read(state)).await?
}

async fn latest(state: &AppState) -> Result<Snapshot, ServerError> {
    off_runtime(state, |state| state.store.latest().ok_or(ServerError::NotReady(NOT_READY))).await
}

pub async fn scores(State(state): State<AppState>) -> Result<Json<Classification>, ServerError> {
    let snapshot = latest(&state).await?;
    Ok(Json(classify(&snapshot.schedule)))
}

pub async fn league_list(State(state): State<AppState>) -> Result<Json<Vec<League>>, ServerError> {
    let snapshot = latest(&state).await?;
    Ok(Json(leagues(&snapshot.schedule)))
}

async fn mirrored(state: &AppState, kind: FeedKind, name: String, missing: String) -> Result<Json<Value>, ServerError> {
    off_runtime(state, move |state| {
        state
            .mirror
            .load(kind, &name)?
            .map(Json)
            .ok_or(ServerError::NotFound(missing))
    })
    .await
}

/// Season fixtures are stored per team; the league segment only scopes the URL.
pub async fn team_fixtures(
    State(state): State<AppState>,
    Path((_league, team)): Path<(String, String)>,
) -> Result<Json<Value>, ServerError> {
    let missing = format!("Season fixtures not found for team '{team}'.");
    mirrored(&state, FeedKind::SeasonFixtures, team, missing).await
}

pub async fn league_fixtures(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let missing = format!("League fixtures not found for '{league}'.");
    mirrored(&state, FeedKind::LeagueFixtures, league, missing).await
}

pub async fn standings(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let missing = format!("Standings not found for league '{league}'.");
    mirrored(&state, FeedKind::Standings, league, missing).await
}
