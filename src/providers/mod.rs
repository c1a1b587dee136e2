/// Upstream data provider abstraction
///
/// The aggregation pipeline talks to three external services: a metadata
/// catalog (TMDB-shaped), a secondary ratings source (OMDb-shaped) and a
/// chat-completion endpoint. Each sits behind a trait so the pipeline
/// can be exercised against mocks.
use crate::error::AppResult;
use crate::models::{MovieRecord, SecondaryRatings};

pub mod omdb;
pub mod openai;
pub mod tmdb;

pub use omdb::OmdbProvider;
pub use openai::OpenAiCompletionClient;
pub use tmdb::TmdbProvider;

/// Canonical movie catalog lookups
///
/// Failures are absorbed at this boundary: a search that cannot reach the
/// provider yields an empty list and a details lookup yields `None`, so a
/// single bad call never aborts a whole enrichment batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Best-effort title search; callers conventionally take the first match
    async fn search_by_title(&self, title: &str, year: Option<i32>) -> Vec<MovieRecord>;

    /// Full record including the cross-reference id for the ratings provider
    async fn details_by_id(&self, id: u64) -> Option<MovieRecord>;

    /// Current now-playing feed, used to populate the recent-watched shelf
    async fn now_playing(&self) -> AppResult<Vec<MovieRecord>>;
}

/// Secondary critic/audience ratings keyed by cross-reference id
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsProvider: Send + Sync {
    /// Single lookup, never retried; `None` covers both HTTP failure and
    /// the provider's own "not found" payload
    async fn by_external_id(&self, imdb_id: &str) -> Option<SecondaryRatings>;
}

/// Hosted text-completion endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one system + user message pair and returns the raw completion text
    async fn complete(&self, system: &str, user: &str) -> AppResult<String>;
}
