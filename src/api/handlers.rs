use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{DashboardSnapshot, GenreMovie, MoodPlaylist, ShelfKey, Suggestion};
use crate::services::collections::PLAYLIST_SIZE;
use crate::services::dedup::ReplaceOutcome;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceEntryRequest {
    pub shelf: ShelfKey,
    pub broken_id: u64,
}

#[derive(Debug, Serialize)]
pub struct ReplaceEntryResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitute_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub count: Option<usize>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Generates suggestions for a free-form prompt
///
/// Never surfaces upstream failures: a bad or unreachable completion
/// service degrades to the static fallback list with a 200.
pub async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationsRequest>,
) -> AppResult<Json<RecommendationsResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("prompt must not be empty".to_string()));
    }

    let recommendations = state.generator.generate_or_fallback(&request.prompt).await;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Current dashboard snapshot; refreshes lazily when stale or empty
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    state.dashboard.initialize().await;
    Json(state.dashboard.snapshot().await)
}

/// Forces a dashboard refresh; concurrent triggers collapse into one pass
pub async fn refresh_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    state.dashboard.refresh().await;
    Json(state.dashboard.snapshot().await)
}

/// Swaps a broken shelf entry for an unused candidate
pub async fn replace_dashboard_entry(
    State(state): State<AppState>,
    Json(request): Json<ReplaceEntryRequest>,
) -> AppResult<Json<ReplaceEntryResponse>> {
    let outcome = state
        .dashboard
        .replace_broken_entry(request.shelf, request.broken_id)
        .await;

    match outcome {
        ReplaceOutcome::Replaced(substitute_id) => Ok(Json(ReplaceEntryResponse {
            outcome: "replaced",
            substitute_id: Some(substitute_id),
        })),
        ReplaceOutcome::Removed => Ok(Json(ReplaceEntryResponse {
            outcome: "removed",
            substitute_id: None,
        })),
        ReplaceOutcome::NotPresent => Err(AppError::NotFound(format!(
            "movie {} is not on the {} shelf",
            request.broken_id, request.shelf
        ))),
    }
}

/// All mood playlists, deduplicated against each other
pub async fn get_moods(State(state): State<AppState>) -> Json<Vec<MoodPlaylist>> {
    Json(state.collections.all_mood_playlists())
}

/// Records for one mood key; unknown moods resolve to the default mood
pub async fn get_mood_movies(
    State(state): State<AppState>,
    Path(mood): Path<String>,
    Query(query): Query<MoodQuery>,
) -> Json<Vec<GenreMovie>> {
    let count = query.count.unwrap_or(PLAYLIST_SIZE);
    Json(state.collections.movies_for_mood(&mood, count))
}
