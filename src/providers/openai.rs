/// Chat-completion client
///
/// `POST {api_url}/chat/completions` with the standard
/// `{model, messages, temperature, max_tokens}` body. A missing key is
/// reported before any network call so the caller can fall back to its
/// static suggestion set without waiting on a timeout.
use crate::{
    error::{AppError, AppResult},
    providers::CompletionClient,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiCompletionClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            api_url,
            model,
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("openai_api_key"))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_status(
                status,
                format!("Completion API error: {}", body),
            ));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("Completion payload: {}", e)))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                AppError::MalformedResponse("Completion contained no content".to_string())
            })
    }
}
