//! WordSnap: product photos in, marketing copy out.
//!
//! [`generator::DescriptionGenerator`] drives a [`gemini::ModelClient`] through
//! prompt building, response parsing, completeness checks, retries and
//! fallback filling. [`routes`] exposes it over HTTP.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod models;
pub mod routes;

pub use error::{AppError, GenerationError, ModelError};
pub use gemini::{GeminiClient, ModelClient};
pub use generator::{DescriptionGenerator, GenerationSettings};
pub use models::{
    Condition, DescriptionSet, GenerationMetadata, GenerationRequest, GenerationResult, ImageAnalysis,
    ProductFeatures, ProductImage, Quantity, Tone,
};
