use std::{fmt, str::FromStr};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DefaultOnNull};
use uuid::Uuid;

use crate::error::GenerationError;

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Writing register requested for the copy.
///
/// Unknown labels fall back to `Professional` rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Luxury,
}

impl Tone {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "casual" => Tone::Casual,
            "luxury" => Tone::Luxury,
            _ => Tone::Professional,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Luxury => "luxury",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => "Use professional, informative language.",
            Tone::Casual => "Use friendly, conversational language.",
            Tone::Luxury => "Use sophisticated, aspirational language.",
        }
    }
}

impl From<String> for Tone {
    fn from(label: String) -> Self {
        Tone::from_label(&label)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    #[default]
    New,
    UsedLikeNew,
    UsedGood,
    UsedFair,
    Refurbished,
}

impl Condition {
    /// Everything that is not factory-new is written up as pre-owned.
    pub fn is_used(&self) -> bool {
        !matches!(self, Condition::New)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::UsedLikeNew => "used-like-new",
            Condition::UsedGood => "used-good",
            Condition::UsedFair => "used-fair",
            Condition::Refurbished => "refurbished",
        }
    }

    pub fn human_label(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::UsedLikeNew => "used - like new",
            Condition::UsedGood => "used - good",
            Condition::UsedFair => "used - fair",
            Condition::Refurbished => "refurbished",
        }
    }
}

impl FromStr for Condition {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used-like-new" => Ok(Condition::UsedLikeNew),
            "used-good" => Ok(Condition::UsedGood),
            "used-fair" => Ok(Condition::UsedFair),
            "refurbished" => Ok(Condition::Refurbished),
            other => Err(GenerationError::InvalidRequest(format!("unknown condition '{other}'"))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quantity {
    #[default]
    Multiple,
    Limited,
    Single,
}

impl FromStr for Quantity {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple" => Ok(Quantity::Multiple),
            "limited" => Ok(Quantity::Limited),
            "single" => Ok(Quantity::Single),
            other => Err(GenerationError::InvalidRequest(format!("unknown quantity '{other}'"))),
        }
    }
}

/// One uploaded product photo, kept as raw bytes until the model client encodes it.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub mime_type: String,
    pub data: Bytes,
}

impl ProductImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { mime_type: mime_type.into(), data: data.into() }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.mime_type.starts_with("image/") {
            return Err(GenerationError::InvalidRequest(format!(
                "only image files are allowed, got '{}'",
                self.mime_type
            )));
        }
        if self.data.is_empty() {
            return Err(GenerationError::InvalidRequest("image file is empty".into()));
        }
        if self.data.len() > MAX_IMAGE_BYTES {
            return Err(GenerationError::InvalidRequest(format!(
                "image is {} bytes, limit is {} bytes",
                self.data.len(),
                MAX_IMAGE_BYTES
            )));
        }
        Ok(())
    }
}

/// Validated input for one description generation. Construct with [`GenerationRequest::new`].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub product_name: String,
    pub category: Option<String>,
    pub specs: Option<String>,
    pub tone: Tone,
    pub condition: Condition,
    pub quantity: Quantity,
    pub images: Vec<ProductImage>,
}

impl GenerationRequest {
    pub fn new(product_name: impl Into<String>, images: Vec<ProductImage>) -> Result<Self, GenerationError> {
        let product_name = product_name.into().trim().to_string();
        if product_name.is_empty() {
            return Err(GenerationError::InvalidRequest("product name is required".into()));
        }
        if images.is_empty() {
            return Err(GenerationError::InvalidRequest("no image files provided".into()));
        }
        if images.len() > MAX_IMAGES {
            return Err(GenerationError::InvalidRequest(format!(
                "at most {MAX_IMAGES} images are allowed, got {}",
                images.len()
            )));
        }
        for image in &images {
            image.validate()?;
        }
        Ok(Self {
            product_name,
            category: None,
            specs: None,
            tone: Tone::default(),
            condition: Condition::default(),
            quantity: Quantity::default(),
            images,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(category.into());
        self
    }

    pub fn with_specs(mut self, specs: impl Into<String>) -> Self {
        self.specs = non_blank(specs.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The five pieces of marketing copy produced for a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionSet {
    pub short: String,
    pub medium: String,
    pub long: String,
    pub bullets: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub generation_id: Uuid,
    pub model: String,
    pub tone: Tone,
    pub condition: Condition,
    pub image_count: usize,
    pub generated_at: DateTime<Utc>,
    pub retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub data: DescriptionSet,
    pub metadata: GenerationMetadata,
}

/// Attributes the model reads off a single product photo.
///
/// Members the model leaves out, sets to `null` or gives the wrong shape come
/// back empty instead of failing the whole analysis.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFeatures {
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub category: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub colors: Vec<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub features: Vec<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub material: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub use_case: String,
}

/// Outcome of an image analysis: structured when the model answered with JSON,
/// otherwise the untouched model text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageAnalysis {
    Structured(ProductFeatures),
    Raw { raw: String },
}
