use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use livematch_core::MappedMatch;
use livematch_state::{LiveStateProjector, MatchHistoryStore};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared read handles over the pipeline state.
#[derive(Clone)]
pub struct AppState {
    pub projector: Arc<LiveStateProjector>,
    pub store: Arc<MatchHistoryStore>,
}

/// One element of the match-history response.
#[derive(Serialize)]
pub struct HistoryStateResponse {
    #[serde(rename = "stateTimeStamp")]
    pub state_time_stamp: String,
    pub state: serde_json::Value,
}

/// Pretty-prints `value` with two-space indentation as `application/json`.
fn pretty_json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "response serialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                "{\n  \"error\": \"internal error\"\n}".to_string(),
            )
                .into_response()
        }
    }
}

/// Serves the live-state projection: all matches currently PRE or LIVE.
pub async fn get_state(State(state): State<AppState>) -> Response {
    let view: BTreeMap<String, MappedMatch> =
        state.projector.current().await.into_iter().collect();
    pretty_json(StatusCode::OK, &view)
}

/// Serves every match's most recent history rendering, REMOVED included.
pub async fn get_internal_state(State(state): State<AppState>) -> Response {
    let mut merged = BTreeMap::new();
    for id in state.store.all_ids().await {
        if let Some(entry) = state.store.current(&id).await {
            merged.insert(id, entry.rendered);
        }
    }
    pretty_json(StatusCode::OK, &merged)
}

/// Serves the full history of one match in insertion order.
pub async fn get_match_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let entries = state.store.history(&id).await;
    if entries.is_empty() {
        return pretty_json(
            StatusCode::NOT_FOUND,
            &json!({ "error": format!("no history for match {id}") }),
        );
    }

    let body: Vec<HistoryStateResponse> = entries
        .into_iter()
        .map(|entry| HistoryStateResponse {
            state_time_stamp: entry.timestamp_iso(),
            state: entry.rendered,
        })
        .collect();

    pretty_json(StatusCode::OK, &body)
}
