//! Status Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{AppState, StatusSnapshot};

/// Response for the status endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub title: String,
    pub session: fault_monitor::SessionState,
    pub latest: Option<StatusSnapshot>,
    pub processed: usize,
    pub faults: usize,
    pub total_samples: usize,
}

/// Get the latest sample status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (latest, processed, faults, total_samples) = state.status();

    Json(StatusResponse {
        title: state.templates().title.to_string(),
        session: state.session_state(),
        latest,
        processed,
        faults,
        total_samples,
    })
}
