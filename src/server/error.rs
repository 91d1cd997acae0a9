use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use livescore_api::store::StoreError;
use log::error;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No snapshot has been collected yet.
    #[error("{0}")]
    NotReady(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ServerError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, (*msg).to_owned()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::Store(_) | ServerError::Task(_) => {
                error!("request failed: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.".to_owned())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
