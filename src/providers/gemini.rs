use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::InsightProviderConfig;
use crate::core::currency::CurrencyCode;
use crate::core::insight::{Insight, InsightError, InsightOutcome, InsightProvider, Sentiment};

/// Market insights from the Gemini `generateContent` REST API, constrained to
/// a `{title, content, sentiment}` JSON object.
pub struct GeminiInsightProvider {
    base_url: String,
    model: String,
    brand: String,
    brand_description: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiInsightProvider {
    pub fn new(
        config: &InsightProviderConfig,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxglance/0.1")
            .timeout(timeout)
            .build()?;
        Ok(GeminiInsightProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            brand: config.brand.clone(),
            brand_description: config.brand_description.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    /// Reads the API key from the environment variable named in the config.
    pub fn from_env(config: &InsightProviderConfig, timeout: Duration) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            debug!(
                "{} is not set, insights will fall back",
                config.api_key_env
            );
        }
        Self::new(config, api_key, timeout)
    }

    pub fn prompt(&self, base: CurrencyCode, target: CurrencyCode, rate: f64) -> String {
        format!(
            "Provide a short financial insight about the currency pair {base} to {target}. \
             The current exchange rate is 1 {base} = {rate} {target}. \
             The user is looking at this via the '{}' ({}) portal. \
             Mention a brief fact about one of these markets and a potential business implication. \
             Keep it professional, encouraging, and under 80 words.",
            self.brand, self.brand_description
        )
    }

    fn request_body(&self, prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: insight_schema(),
            },
        }
    }

    async fn try_fetch(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
        rate: f64,
    ) -> Result<Insight, InsightError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(InsightError::InvalidRate(rate));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InsightError::MissingCredential)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting insight from {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(self.prompt(base, target, rate)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| InsightError::Malformed(e.to_string()))?;

        let payload = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| InsightError::Malformed("no text in response candidates".to_string()))?;

        parse_insight(&payload)
    }
}

fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
            "sentiment": {
                "type": "STRING",
                "enum": ["positive", "neutral", "negative"],
                "description": "One of: positive, neutral, or negative"
            }
        },
        "required": ["title", "content", "sentiment"]
    })
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InsightPayload {
    title: String,
    content: String,
    sentiment: String,
}

fn parse_insight(payload: &str) -> Result<Insight, InsightError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| InsightError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(InsightError::Schema("expected a JSON object".to_string()));
    }
    let raw: InsightPayload =
        serde_json::from_value(value).map_err(|e| InsightError::Schema(e.to_string()))?;

    let title = raw.title.trim();
    let content = raw.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(InsightError::Schema("empty title or content".to_string()));
    }

    Ok(Insight {
        title: title.to_string(),
        content: content.to_string(),
        sentiment: raw.sentiment.parse::<Sentiment>()?,
    })
}

#[async_trait]
impl InsightProvider for GeminiInsightProvider {
    #[instrument(name = "GeminiInsightFetch", skip(self), fields(base = %base, target = %target))]
    async fn fetch_insight(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
        rate: f64,
    ) -> InsightOutcome {
        InsightOutcome::from_result(self.try_fetch(base, target, rate).await)
    }
}
