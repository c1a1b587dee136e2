use std::sync::Arc;

use crate::config::Config;
use crate::providers::{
    CompletionClient, MetadataProvider, OmdbProvider, OpenAiCompletionClient, RatingsProvider,
    TmdbProvider,
};
use crate::services::{DashboardService, GenreCollections, RecommendationGenerator};

/// Shared application state
///
/// Every service is an explicit handle built once at startup; handlers
/// receive clones of this struct, never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub collections: Arc<GenreCollections>,
    pub generator: Arc<RecommendationGenerator>,
}

impl AppState {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        ratings: Arc<dyn RatingsProvider>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            dashboard: Arc::new(DashboardService::new(
                Arc::clone(&metadata),
                ratings,
                Arc::clone(&completion),
            )),
            collections: Arc::new(GenreCollections::new()),
            generator: Arc::new(RecommendationGenerator::new(completion)),
        }
    }

    /// Wires the real providers from configuration
    pub fn from_config(config: &Config) -> Self {
        let metadata: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
        ));
        let ratings: Arc<dyn RatingsProvider> = Arc::new(OmdbProvider::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
        ));
        let completion: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletionClient::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.completion_model.clone(),
        ));
        Self::new(metadata, ratings, completion)
    }
}
