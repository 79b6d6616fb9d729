//! Description generation: prompt, model call, parse, validate, retry, fill.

pub mod completeness;
pub mod fallback;
pub mod parser;
pub mod prompt;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    error::{GenerationError, ModelError},
    gemini::ModelClient,
    models::{
        DescriptionSet, GenerationMetadata, GenerationRequest, GenerationResult, ImageAnalysis, ProductFeatures,
        ProductImage,
    },
};
use completeness::validate;
use fallback::fill_missing;
use parser::{json_block, parse_descriptions};
use prompt::{build_prompt, PromptInput, ANALYSIS_PROMPT};

pub const MAX_RETRIES: u32 = 2;
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

const RAW_LOG_CHARS: usize = 500;

/// Knobs for the attempt loop. `Default` gives the production values.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
    pub first_temperature: f32,
    pub retry_temperature: f32,
    pub max_output_tokens: u32,
    pub analysis_temperature: f32,
    pub analysis_max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            timeout: GENERATION_TIMEOUT,
            backoff: RETRY_BACKOFF,
            first_temperature: 0.7,
            retry_temperature: 0.8,
            max_output_tokens: 4096,
            analysis_temperature: 0.4,
            analysis_max_output_tokens: 1024,
        }
    }
}

impl GenerationSettings {
    fn temperature_for(&self, attempt: u32) -> f32 {
        if attempt == 0 {
            self.first_temperature
        } else {
            self.retry_temperature
        }
    }

    fn attempt_limit(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// What one model round-trip produced.
#[derive(Debug)]
enum AttemptOutcome {
    Complete(DescriptionSet),
    Incomplete(DescriptionSet),
    Failed(ModelError),
}

#[derive(Debug)]
enum Transition {
    Success(DescriptionSet),
    Retry,
    FallbackFill(DescriptionSet),
    Fatal(ModelError),
}

/// `attempt` is 0-based; a retry is only possible while another attempt fits under `limit`.
fn next_transition(attempt: u32, limit: u32, outcome: AttemptOutcome) -> Transition {
    let attempts_remain = attempt + 1 < limit;
    match outcome {
        AttemptOutcome::Complete(descriptions) => Transition::Success(descriptions),
        AttemptOutcome::Incomplete(_) | AttemptOutcome::Failed(_) if attempts_remain => Transition::Retry,
        AttemptOutcome::Incomplete(descriptions) => Transition::FallbackFill(descriptions),
        AttemptOutcome::Failed(err) => Transition::Fatal(err),
    }
}

fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct DescriptionGenerator {
    client: Arc<dyn ModelClient>,
    settings: GenerationSettings,
}

impl DescriptionGenerator {
    pub fn new(client: Arc<dyn ModelClient>, settings: GenerationSettings) -> Self {
        Self { client, settings }
    }

    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    /// Generates the five-field description set for `request`.
    ///
    /// Content that stays incomplete after the last attempt is repaired with
    /// fallback copy, so `Ok` always carries a complete set. Only model
    /// failures on the final attempt surface as
    /// [`GenerationError::GenerationFailed`].
    pub async fn generate_description(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let generation_id = Uuid::new_v4();
        let span = info_span!("generate", %generation_id, product = %request.product_name);
        self.run(request, generation_id).instrument(span).await
    }

    async fn run(&self, request: &GenerationRequest, generation_id: Uuid) -> Result<GenerationResult, GenerationError> {
        let prompt = build_prompt(&PromptInput::from(request));
        let limit = self.settings.attempt_limit();
        let mut attempt = 0;

        info!(
            tone = %request.tone,
            condition = %request.condition,
            image_count = request.image_count(),
            "🚀 Generating description"
        );

        loop {
            let outcome = self.attempt(request, &prompt, attempt).await;
            match next_transition(attempt, limit, outcome) {
                Transition::Success(descriptions) => {
                    return Ok(self.finish(request, descriptions, attempt, generation_id));
                }
                Transition::FallbackFill(mut descriptions) => {
                    fill_missing(&mut descriptions, &request.product_name, request.condition);
                    return Ok(self.finish(request, descriptions, attempt, generation_id));
                }
                Transition::Retry => {
                    info!(next_attempt = attempt + 2, "🔄 Retrying generation in {:?}", self.settings.backoff);
                    sleep(self.settings.backoff).await;
                    attempt += 1;
                }
                Transition::Fatal(err) => {
                    error!(attempts = attempt + 1, "❌ Generation failed: {}", err);
                    return Err(GenerationError::GenerationFailed {
                        attempts: attempt + 1,
                        last_error: err.to_string(),
                    });
                }
            }
        }
    }

    /// One request raced against the timeout. A call that loses the race is
    /// dropped, which cancels it, so its eventual answer is never seen.
    async fn attempt(&self, request: &GenerationRequest, prompt: &str, attempt: u32) -> AttemptOutcome {
        let temperature = self.settings.temperature_for(attempt);
        info!(
            attempt = attempt + 1,
            temperature,
            prompt_len = prompt.len(),
            max_tokens = self.settings.max_output_tokens,
            "📤 Sending request to model"
        );

        let call = self.client.generate(&request.images, prompt, temperature, self.settings.max_output_tokens);
        let text = match timeout(self.settings.timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                error!(attempt = attempt + 1, "❌ Model call failed: {}", err);
                return AttemptOutcome::Failed(err);
            }
            Err(_) => {
                let err = ModelError::Timeout(self.settings.timeout);
                error!(attempt = attempt + 1, "❌ Model call failed: {}", err);
                return AttemptOutcome::Failed(err);
            }
        };

        info!(attempt = attempt + 1, response_len = text.len(), "📥 Received response from model");

        let descriptions = parse_descriptions(&text);
        let validation = validate(&descriptions);
        if validation.is_valid {
            AttemptOutcome::Complete(descriptions)
        } else {
            warn!(
                attempt = attempt + 1,
                missing = ?validation.missing,
                response_len = text.len(),
                "⚠️ Incomplete AI response"
            );
            debug!("Raw AI response: {}", head(&text, RAW_LOG_CHARS));
            AttemptOutcome::Incomplete(descriptions)
        }
    }

    fn finish(
        &self,
        request: &GenerationRequest,
        descriptions: DescriptionSet,
        attempt: u32,
        generation_id: Uuid,
    ) -> GenerationResult {
        info!(
            attempt = attempt + 1,
            short = descriptions.short.len(),
            medium = descriptions.medium.len(),
            long = descriptions.long.len(),
            bullets = descriptions.bullets.len(),
            keywords = descriptions.keywords.len(),
            "✅ Description generated successfully"
        );

        GenerationResult {
            success: true,
            data: descriptions,
            metadata: GenerationMetadata {
                generation_id,
                model: self.client.model_id().to_string(),
                tone: request.tone,
                condition: request.condition,
                image_count: request.image_count(),
                generated_at: Utc::now(),
                retries: attempt,
            },
        }
    }

    /// Single-shot feature extraction from one photo. No retries, no validation.
    pub async fn analyze_image(&self, image: &ProductImage) -> Result<ImageAnalysis, GenerationError> {
        image.validate()?;
        info!(bytes = image.data.len(), mime = %image.mime_type, "🔍 Analyzing product image");

        let call = self.client.generate(
            std::slice::from_ref(image),
            ANALYSIS_PROMPT,
            self.settings.analysis_temperature,
            self.settings.analysis_max_output_tokens,
        );
        let text = match timeout(self.settings.timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => return Err(GenerationError::AnalysisFailed(err.to_string())),
            Err(_) => {
                let err = ModelError::Timeout(self.settings.timeout);
                return Err(GenerationError::AnalysisFailed(err.to_string()));
            }
        };

        Ok(interpret_analysis(&text))
    }
}

fn interpret_analysis(text: &str) -> ImageAnalysis {
    match json_block(text).map(serde_json::from_str::<ProductFeatures>) {
        Some(Ok(features)) => ImageAnalysis::Structured(features),
        Some(Err(e)) => {
            warn!("⚠️ Analysis JSON did not parse, returning raw text: {}", e);
            ImageAnalysis::Raw { raw: text.to_string() }
        }
        None => ImageAnalysis::Raw { raw: text.to_string() },
    }
}
