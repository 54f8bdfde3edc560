//! Alert Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AlertRecord, AppState};

/// Query parameters for alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by outcome ("sent", "suppressed", "delivery_failed")
    pub outcome: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub data: Vec<AlertRecord>,
    pub count: usize,
    pub failed_count: usize,
}

/// Get recent alerts, newest first
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Json<AlertResponse> {
    let alerts: Vec<AlertRecord> = state
        .recent_alerts(usize::MAX)
        .into_iter()
        .filter(|a| params.outcome.as_deref().map_or(true, |o| a.outcome == o))
        .take(params.limit)
        .collect();

    let failed = alerts.iter().filter(|a| !a.failed.is_empty()).count();

    Json(AlertResponse {
        count: alerts.len(),
        failed_count: failed,
        data: alerts,
    })
}
