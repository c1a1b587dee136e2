use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Canonical enriched movie record
///
/// Produced by the enrichment pipeline from a metadata-provider lookup,
/// optionally merged with a ratings-provider bundle. `id` lives in the
/// metadata provider's namespace and is the dedup key across all shelves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Poster path fragment; absent records are hidden from poster-driven shelves
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date; `None` when the provider sends an empty or partial date
    #[serde(default, deserialize_with = "deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
    /// Metadata-provider aggregate score, independent of secondary ratings
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    /// Cross-reference id for the ratings provider; absent until resolved via details
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// Secondary ratings bundle; entirely absent when the lookup was skipped or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_ratings: Option<SecondaryRatings>,
    /// Populated only for records that originated from the recommendation generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
}

impl MovieRecord {
    /// Numeric value of the ratings-provider score, if present and parseable
    pub fn secondary_score(&self) -> Option<f64> {
        self.secondary_ratings
            .as_ref()
            .and_then(|r| r.imdb_rating.parse::<f64>().ok())
    }
}

/// Providers send release dates as strings that may be empty or year-only;
/// anything that is not a full calendar date maps to `None`.
fn deserialize_release_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Supplementary ratings fetched from the ratings provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondaryRatings {
    pub imdb_rating: String,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
    #[serde(default)]
    pub awards: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub runtime: String,
}

/// One named critic/audience score, e.g. ("Rotten Tomatoes", "93%")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingEntry {
    pub source: String,
    pub value: String,
}

/// Ephemeral suggestion from the recommendation generator
///
/// Consumed immediately by the enrichment pipeline, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub genre: String,
}

impl Suggestion {
    /// Year as a number, when the generator produced a usable one
    pub fn year_number(&self) -> Option<i32> {
        self.year.trim().parse().ok()
    }
}

/// Named shelves the dashboard aggregate tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfKey {
    RecentWatched,
    TopReleases,
}

impl Display for ShelfKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShelfKey::RecentWatched => write!(f, "recent_watched"),
            ShelfKey::TopReleases => write!(f, "top_releases"),
        }
    }
}

/// Full dashboard aggregate pushed to subscribers on every refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub recent_watched: Vec<MovieRecord>,
    pub top_releases: Vec<MovieRecord>,
    pub is_loading: bool,
    /// Unix millis of the last successful refresh; 0 before the first one
    pub last_updated: i64,
}

impl DashboardSnapshot {
    pub fn empty() -> Self {
        Self {
            recent_watched: Vec::new(),
            top_releases: Vec::new(),
            is_loading: false,
            last_updated: 0,
        }
    }
}

/// A lightweight curated record used by the mood playlists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreMovie {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub release_date: String,
    pub vote_average: f64,
    pub genre_primary: String,
}

/// A mood playlist assembled from the curated genre pools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodPlaylist {
    pub title: String,
    pub description: String,
    pub movie_count: String,
    pub genre: String,
    pub genre_keys: Vec<String>,
    pub movies: Vec<GenreMovie>,
}
