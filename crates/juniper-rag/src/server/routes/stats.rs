//! Health and statistics endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::state::AppState;
use crate::types::EngineStats;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub stats: EngineStats,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: EngineStats,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        stats: state.engine().stats().await,
    })
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.engine().stats().await,
        timestamp: Utc::now(),
    })
}
