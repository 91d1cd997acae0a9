pub mod error;
pub mod handlers;

use crate::feeds::MirrorStore;
use axum::Router;
use axum::routing::get;
use livescore_api::SnapshotStore;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Read-only API state: the snapshot store and the mirrored feeds.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SnapshotStore>,
    pub mirror: MirrorStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/scores", get(handlers::scores))
        .route("/api/leagues", get(handlers::league_list))
        .route("/api/fixtures/{league}", get(handlers::league_fixtures))
        .route("/api/fixtures/{league}/{team}", get(handlers::team_fixtures))
        .route("/api/standings/{league}", get(handlers::standings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("api listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
