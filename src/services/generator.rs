/// Recommendation generator
///
/// Wraps the completion endpoint and turns a free-text prompt into a
/// bounded list of structured suggestions. Completions are prose by
/// nature, so parsing locates the first balanced JSON block rather than
/// trusting the whole payload; anything unparseable fails closed and the
/// caller falls back to the static suggestion set.
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::Suggestion,
    providers::CompletionClient,
    services::fallback,
};

/// Suggestions per batch; the prompt requests exactly this many
pub const MAX_SUGGESTIONS: usize = 15;

const SYSTEM_PROMPT: &str =
    "You are a movie expert. Provide accurate, recent movie recommendations in JSON format.";

pub struct RecommendationGenerator {
    client: Arc<dyn CompletionClient>,
}

impl RecommendationGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Prompt for the top-releases shelf: a 6-month date window and a
    /// strict quality bar, requesting a fixed-size JSON array
    pub fn top_releases_prompt() -> String {
        let now = Utc::now().date_naive();
        let window_start = now - Duration::days(6 * 30);

        format!(
            "Provide a list of exactly {count} popular movies released between \
             {start} and {end} that have IMDb ratings above 7.0 and are well-known \
             blockbusters or critically acclaimed films.\n\n\
             Requirements:\n\
             - Movies MUST be released between {start} and {end}\n\
             - Movies MUST have IMDb ratings above 7.0\n\
             - Exact titles that match IMDb/TMDB\n\
             - Prioritize popular mainstream films with wide releases\n\n\
             For each movie provide the exact title, year, a 1-2 sentence reason, \
             and the primary genre.\n\n\
             Format as JSON array:\n\
             [\n  {{\n    \"title\": \"Movie Title\",\n    \"year\": \"2024\",\n    \
             \"reason\": \"Brief recommendation reason\",\n    \"genre\": \"Primary genre\"\n  }}\n]",
            count = MAX_SUGGESTIONS,
            start = window_start,
            end = now,
        )
    }

    /// Runs a prompt through the completion service and parses the result
    ///
    /// Error variants are kept distinct: missing credential and non-2xx
    /// surface as-is, while an unparseable completion maps to
    /// `MalformedResponse`.
    pub async fn generate(&self, prompt: &str) -> AppResult<Vec<Suggestion>> {
        let content = self.client.complete(SYSTEM_PROMPT, prompt).await?;
        let suggestions = parse_suggestions(&content)?;

        tracing::info!(
            suggestions = suggestions.len(),
            "Recommendation batch generated"
        );

        Ok(suggestions)
    }

    /// Like `generate`, but degrades to the static suggestion list on any
    /// failure; this is the behavior of the aggregation endpoint
    pub async fn generate_or_fallback(&self, prompt: &str) -> Vec<Suggestion> {
        match self.generate(prompt).await {
            Ok(suggestions) => suggestions,
            Err(AppError::MalformedResponse(reason)) => {
                tracing::warn!(reason = %reason, "Bad completion, using fallback suggestions");
                fallback::fallback_suggestions()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Completion service unavailable, using fallback suggestions");
                fallback::fallback_suggestions()
            }
        }
    }
}

/// Parses a completion into suggestions, tolerating prose around the JSON
fn parse_suggestions(content: &str) -> AppResult<Vec<Suggestion>> {
    let block = extract_json_block(content).ok_or_else(|| {
        AppError::MalformedResponse("Completion contained no JSON block".to_string())
    })?;

    let suggestions: Vec<Suggestion> = if block.starts_with('[') {
        serde_json::from_str(block)
            .map_err(|e| AppError::MalformedResponse(format!("Suggestion array: {}", e)))?
    } else {
        let single: Suggestion = serde_json::from_str(block)
            .map_err(|e| AppError::MalformedResponse(format!("Suggestion object: {}", e)))?;
        vec![single]
    };

    Ok(suggestions.into_iter().take(MAX_SUGGESTIONS).collect())
}

/// Returns the first balanced `[...]` or `{...}` substring of `text`
///
/// Bracket depth is tracked outside string literals only, so titles
/// containing brackets or escaped quotes do not break the scan.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let open = text.as_bytes()[start];
    let close = if open == b'[' { b']' } else { b'}' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }

    None
}
