/// TMDB metadata provider
///
/// Three endpoints are used:
/// 1. `/search/movie?query=&year=` for free-text resolution of generated suggestions
/// 2. `/movie/{id}` for full detail, which carries the `imdb_id` cross-reference
/// 3. `/movie/now_playing` for the recent-watched shelf feed
///
/// Auth is either a query-string `api_key` or a bearer token; the bearer
/// token wins when both are configured.
use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
    providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieRecord>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_token: Option<String>,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: Option<String>, api_token: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            api_token,
            api_url,
        }
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some() || self.api_token.is_some()
    }

    /// Issues a GET with whichever credential is configured
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        if !self.has_credentials() {
            return Err(AppError::MissingCredential("tmdb_api_key"));
        }

        let url = format!("{}{}", self.api_url, path);
        let mut request = self.http_client.get(&url).query(query);

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        } else if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_status(
                status,
                format!("TMDB API error: {}", body),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("TMDB response: {}", e)))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_by_title(&self, title: &str, year: Option<i32>) -> Vec<MovieRecord> {
        let mut query = vec![("query", title.to_string()), ("page", "1".to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        match self.get_json::<SearchResponse>("/search/movie", &query).await {
            Ok(response) => {
                tracing::debug!(
                    query = %title,
                    results = response.results.len(),
                    provider = "tmdb",
                    "Title search completed"
                );
                response.results
            }
            Err(e) => {
                tracing::warn!(query = %title, error = %e, "TMDB search failed");
                Vec::new()
            }
        }
    }

    async fn details_by_id(&self, id: u64) -> Option<MovieRecord> {
        match self
            .get_json::<MovieRecord>(&format!("/movie/{}", id), &[])
            .await
        {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(movie_id = id, error = %e, "TMDB details lookup failed");
                None
            }
        }
    }

    async fn now_playing(&self) -> AppResult<Vec<MovieRecord>> {
        let response: SearchResponse = self
            .get_json("/movie/now_playing", &[("page", "1".to_string())])
            .await?;

        tracing::info!(
            results = response.results.len(),
            provider = "tmdb",
            "Now-playing feed fetched"
        );

        Ok(response.results)
    }
}
