use serde::Deserialize;

/// Application configuration loaded from environment variables
///
/// All provider credentials are optional. A missing key degrades the
/// feature it powers (no ratings enrichment, static suggestions instead
/// of generated ones) instead of failing startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Metadata provider (TMDB) API key; accepted as a query-string key
    pub tmdb_api_key: Option<String>,

    /// Metadata provider bearer token; used instead of the query key when set
    pub tmdb_api_token: Option<String>,

    /// Metadata provider base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Ratings provider (OMDb) API key
    pub omdb_api_key: Option<String>,

    /// Ratings provider base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Completion service API key
    pub openai_api_key: Option<String>,

    /// Completion service base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Completion model name
    #[serde(default = "default_completion_model")]
    pub completion_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
