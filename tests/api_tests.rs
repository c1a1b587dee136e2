use std::collections::HashSet;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use reelshelf::api::{create_router, AppState};
use reelshelf::error::{AppError, AppResult};
use reelshelf::models::{MovieRecord, SecondaryRatings};
use reelshelf::providers::{CompletionClient, MetadataProvider, RatingsProvider};

// Stub providers: integration tests exercise the full router with the
// network seams swapped out.

struct StubMetadata;

fn movie(id: u64, title: &str) -> MovieRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "overview": "A movie.",
        "poster_path": "/poster.jpg",
        "release_date": "2026-07-15",
        "vote_average": 7.8,
        "vote_count": 1500,
        "imdb_id": format!("tt{:07}", id)
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl MetadataProvider for StubMetadata {
    async fn search_by_title(&self, title: &str, _year: Option<i32>) -> Vec<MovieRecord> {
        vec![movie(9000, title)]
    }

    async fn details_by_id(&self, id: u64) -> Option<MovieRecord> {
        Some(movie(id, "Details"))
    }

    async fn now_playing(&self) -> AppResult<Vec<MovieRecord>> {
        Ok((1..=15)
            .map(|i| movie(i, &format!("Now Playing {}", i)))
            .collect())
    }
}

struct StubRatings;

#[async_trait::async_trait]
impl RatingsProvider for StubRatings {
    async fn by_external_id(&self, _imdb_id: &str) -> Option<SecondaryRatings> {
        None
    }
}

struct StubCompletion {
    reply: Option<String>,
}

#[async_trait::async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> AppResult<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(AppError::MissingCredential("openai_api_key")),
        }
    }
}

fn create_test_server(completion_reply: Option<String>) -> TestServer {
    let state = AppState::new(
        Arc::new(StubMetadata),
        Arc::new(StubRatings),
        Arc::new(StubCompletion {
            reply: completion_reply,
        }),
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(None);
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_recommendations_fall_back_on_completion_failure() {
    let server = create_test_server(None);

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "prompt": "movies like Blade Runner" }))
        .await;

    // Upstream failure still answers 200 with the static list
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert!(recommendations.iter().all(|r| r["title"].is_string()));
}

#[tokio::test]
async fn test_recommendations_parse_prose_wrapped_completion() {
    let reply = concat!(
        "Here are some great picks for you:\n",
        r#"[{"title": "Arrival", "year": "2016", "reason": "Cerebral first-contact drama", "genre": "Sci-Fi"},"#,
        r#" {"title": "Ex Machina", "year": "2015", "reason": "Tense AI chamber piece", "genre": "Sci-Fi"}]"#,
        "\nEnjoy!"
    );
    let server = create_test_server(Some(reply.to_string()));

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "prompt": "smart sci-fi" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0]["title"], "Arrival");
    assert_eq!(recommendations[1]["year"], "2015");
}

#[tokio::test]
async fn test_recommendations_reject_empty_prompt() {
    let server = create_test_server(None);

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "prompt": "   " }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_initializes_on_first_hit() {
    let server = create_test_server(None);

    let response = server.get("/api/dashboard").await;
    response.assert_status_ok();

    let snapshot: serde_json::Value = response.json();
    assert_eq!(snapshot["is_loading"], false);
    assert!(snapshot["last_updated"].as_i64().unwrap() > 0);
    assert!(!snapshot["recent_watched"].as_array().unwrap().is_empty());
    assert!(!snapshot["top_releases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_shelves_share_no_ids() {
    let server = create_test_server(None);

    let snapshot: serde_json::Value = server.get("/api/dashboard").await.json();
    let ids: Vec<u64> = snapshot["recent_watched"]
        .as_array()
        .unwrap()
        .iter()
        .chain(snapshot["top_releases"].as_array().unwrap())
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    let distinct: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), distinct.len());
}

#[tokio::test]
async fn test_dashboard_replace_swaps_entry() {
    let server = create_test_server(None);

    let snapshot: serde_json::Value = server.post("/api/dashboard/refresh").await.json();
    let broken_id = snapshot["recent_watched"][0]["id"].as_u64().unwrap();

    let response = server
        .post("/api/dashboard/replace")
        .json(&json!({ "shelf": "recent_watched", "broken_id": broken_id }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "replaced");
    let substitute_id = body["substitute_id"].as_u64().unwrap();
    assert_ne!(substitute_id, broken_id);

    let after: serde_json::Value = server.get("/api/dashboard").await.json();
    let shelf = after["recent_watched"].as_array().unwrap();
    assert!(shelf.iter().all(|m| m["id"].as_u64().unwrap() != broken_id));
    assert!(shelf
        .iter()
        .any(|m| m["id"].as_u64().unwrap() == substitute_id));
}

#[tokio::test]
async fn test_dashboard_replace_unknown_id_is_404() {
    let server = create_test_server(None);
    server.post("/api/dashboard/refresh").await;

    let response = server
        .post("/api/dashboard/replace")
        .json(&json!({ "shelf": "top_releases", "broken_id": 987654321 }))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_moods_are_deduplicated_playlists() {
    let server = create_test_server(None);

    let response = server.get("/api/moods").await;
    response.assert_status_ok();

    let playlists: Vec<serde_json::Value> = response.json();
    assert_eq!(playlists.len(), 5);

    let all_ids: Vec<u64> = playlists
        .iter()
        .flat_map(|p| p["movies"].as_array().unwrap())
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    let distinct: HashSet<u64> = all_ids.iter().copied().collect();
    assert_eq!(all_ids.len(), distinct.len());
}

#[tokio::test]
async fn test_mood_movies_honor_count_and_aliases() {
    let server = create_test_server(None);

    let response = server.get("/api/moods/horror-marathon?count=6").await;
    response.assert_status_ok();
    let movies: Vec<serde_json::Value> = response.json();
    assert_eq!(movies.len(), 6);

    // Alias resolves to the same canonical mood and shuffle
    let aliased: Vec<serde_json::Value> = server.get("/api/moods/scary?count=6").await.json();
    assert_eq!(movies, aliased);
}
