use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{debug, error, info};

use crate::{error::ModelError, models::ProductImage};

pub const DEMO_KEY: &str = "DEMO_KEY";

/// The one outbound capability the generator depends on.
///
/// Implementations send every image plus the prompt in a single request and
/// return the model's text. Timeouts are enforced by the caller.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(
        &self,
        images: &[ProductImage],
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ModelError>;

    fn model_id(&self) -> &str;
}

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 {
                            let truncated = format!("{}...[truncated {} chars]", &s[..50], s.len() - 50);
                            *val = serde_json::Value::String(truncated);
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.api_key == DEMO_KEY
    }

    fn endpoint_with_key(&self, key: &str) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, key)
    }

    /// The request URL as it may appear in logs.
    fn redacted_endpoint(&self) -> String {
        self.endpoint_with_key("***")
    }

    fn build_request(
        images: &[ProductImage],
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> GenerateContentRequest {
        let mut parts: Vec<RequestPart> = images
            .iter()
            .map(|image| RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            })
            .collect();
        parts.push(RequestPart::Text { text: prompt.to_string() });

        GenerateContentRequest {
            contents: vec![RequestContent { role: "user".into(), parts }],
            generation_config: GenerationConfig {
                temperature: Some(temperature),
                top_p: Some(0.9),
                max_output_tokens: Some(max_output_tokens),
                candidate_count: Some(1),
            },
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        images: &[ProductImage],
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, ModelError> {
        if self.is_demo() {
            info!("Using demo mode - no model call made");
            return Ok("Demo mode: configure GEMINI_API_KEY to generate real product copy.".to_string());
        }

        let url = self.endpoint_with_key(&self.api_key);
        info!("🔗 Making request to: {}", self.redacted_endpoint());

        let request_body = Self::build_request(images, prompt, temperature, max_output_tokens);
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(mut value) = serde_json::to_value(&request_body) {
                truncate_base64_in_json(&mut value);
                debug!("📤 Request body: {}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
        }

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.without_url().to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await.map_err(|e| ModelError::Unavailable(e.without_url().to_string()))?;
        if !status.is_success() {
            error!("❌ API Error response: {}", response_text);
            return Err(ModelError::Unavailable(format!("status={} body={}", status, response_text)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| ModelError::InvalidResponse(format!("parse error: {}", e)))?;

        extract_text(&parsed).ok_or_else(|| ModelError::InvalidResponse("no text candidate in response".into()))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_output_tokens: Option<u32>,
    candidate_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePart {
    Text { text: String },
    Other(serde_json::Value),
}

/// Joins the text parts of the first candidate; `None` when there is nothing usable.
fn extract_text(resp: &GenerateContentResponse) -> Option<String> {
    let candidate = resp.candidates.first()?;
    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| match p {
            ResponsePart::Text { text } => Some(text.as_str()),
            ResponsePart::Other(_) => None,
        })
        .collect();
    (!text.trim().is_empty()).then_some(text)
}
