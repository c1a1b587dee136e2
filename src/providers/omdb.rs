/// OMDb ratings provider
///
/// One flat endpoint: `GET /?i={imdb_id}&apikey=`. The provider signals
/// "not found" in-band with `Response: "False"`, which is treated the
/// same as an HTTP failure. Lookups are never retried; a miss leaves the
/// record without secondary ratings instead of dropping it.
use crate::{
    models::{RatingEntry, SecondaryRatings},
    providers::RatingsProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Raw OMDb payload; field names follow the provider's capitalized scheme
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRating>,
    #[serde(rename = "Awards", default)]
    awards: Option<String>,
    #[serde(rename = "Genre", default)]
    genre: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

impl OmdbResponse {
    fn into_bundle(self) -> Option<SecondaryRatings> {
        if self.response != "True" {
            return None;
        }

        Some(SecondaryRatings {
            imdb_rating: self.imdb_rating.unwrap_or_default(),
            ratings: self
                .ratings
                .into_iter()
                .map(|r| RatingEntry {
                    source: r.source,
                    value: r.value,
                })
                .collect(),
            awards: self.awards.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            runtime: self.runtime.unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            api_url,
        }
    }

    /// True when a key is configured; without one every lookup is skipped
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl RatingsProvider for OmdbProvider {
    async fn by_external_id(&self, imdb_id: &str) -> Option<SecondaryRatings> {
        let api_key = self.api_key.as_deref()?;

        let response = match self
            .http_client
            .get(&self.api_url)
            .query(&[("i", imdb_id), ("apikey", api_key)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(imdb_id = %imdb_id, error = %e, "OMDb request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                imdb_id = %imdb_id,
                status = response.status().as_u16(),
                "OMDb returned non-success status"
            );
            return None;
        }

        let payload: OmdbResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(imdb_id = %imdb_id, error = %e, "OMDb response unparseable");
                return None;
            }
        };

        payload.into_bundle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omdb_response_deserialization() {
        let json = r#"{
            "Title": "Dune: Part Two",
            "Response": "True",
            "imdbRating": "8.5",
            "Ratings": [
                { "Source": "Internet Movie Database", "Value": "8.5/10" },
                { "Source": "Rotten Tomatoes", "Value": "92%" }
            ],
            "Awards": "Won 1 Oscar",
            "Genre": "Action, Adventure, Drama",
            "Runtime": "166 min"
        }"#;

        let bundle = serde_json::from_str::<OmdbResponse>(json)
            .unwrap()
            .into_bundle()
            .unwrap();
        assert_eq!(bundle.imdb_rating, "8.5");
        assert_eq!(bundle.ratings.len(), 2);
        assert_eq!(bundle.ratings[1].source, "Rotten Tomatoes");
        assert_eq!(bundle.awards, "Won 1 Oscar");
        assert_eq!(bundle.runtime, "166 min");
    }

    #[test]
    fn test_response_false_maps_to_none() {
        let json = r#"{ "Response": "False", "Error": "Movie not found!" }"#;
        let bundle = serde_json::from_str::<OmdbResponse>(json)
            .unwrap()
            .into_bundle();
        assert!(bundle.is_none());
    }

    #[test]
    fn test_sparse_payload_fills_defaults() {
        let json = r#"{ "Response": "True", "imdbRating": "7.2" }"#;
        let bundle = serde_json::from_str::<OmdbResponse>(json)
            .unwrap()
            .into_bundle()
            .unwrap();
        assert_eq!(bundle.imdb_rating, "7.2");
        assert!(bundle.ratings.is_empty());
        assert_eq!(bundle.awards, "");
    }

    #[tokio::test]
    async fn test_lookup_without_key_is_skipped() {
        let provider = OmdbProvider::new(None, "http://test.local".to_string());
        assert!(!provider.is_configured());
        assert_eq!(provider.by_external_id("tt15239678").await, None);
    }
}
