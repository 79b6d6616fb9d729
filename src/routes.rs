use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{AppError, GenerationError},
    generator::DescriptionGenerator,
    models::{Condition, GenerationRequest, ProductImage, Quantity, Tone, MAX_IMAGES, MAX_IMAGE_BYTES},
};

/// Five full-size images plus room for the text fields and multipart framing.
const BODY_LIMIT: usize = MAX_IMAGES * MAX_IMAGE_BYTES + 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<DescriptionGenerator>,
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate_description))
        .route("/api/generate/analyze", post(analyze_image))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "model": state.generator.model_id(),
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Text fields and files of one multipart upload, keyed by form field name.
#[derive(Default)]
struct Upload {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<ProductImage>>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut upload = Upload::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() {
                let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let data = field.bytes().await?;
                upload.files.entry(name).or_default().push(ProductImage::new(mime_type, data));
            } else {
                let value = field.text().await?;
                upload.fields.insert(name, value);
            }
        }
        Ok(upload)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    fn take_files(&mut self, name: &str) -> Vec<ProductImage> {
        self.files.remove(name).unwrap_or_default()
    }

    fn into_generation_request(mut self) -> Result<GenerationRequest, GenerationError> {
        let images = self.take_files("images");
        let condition = self.text("condition").map(str::parse::<Condition>).transpose()?.unwrap_or_default();
        let quantity = self.text("quantity").map(str::parse::<Quantity>).transpose()?.unwrap_or_default();
        let tone = self.text("tone").map(Tone::from_label).unwrap_or_default();

        let mut request = GenerationRequest::new(self.text("productName").unwrap_or_default(), images)?
            .with_tone(tone)
            .with_condition(condition)
            .with_quantity(quantity);
        if let Some(category) = self.text("category") {
            request = request.with_category(category);
        }
        if let Some(specs) = self.text("specs") {
            request = request.with_specs(specs);
        }
        Ok(request)
    }
}

pub async fn generate_description(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let request = Upload::read(multipart).await?.into_generation_request()?;
    let image_count = request.image_count();
    tracing::info!(
        product = %request.product_name,
        image_count,
        total_bytes = request.images.iter().map(|i| i.data.len()).sum::<usize>(),
        "📨 Generation request received"
    );

    let result = state.generator.generate_description(&request).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Analyzed {} image{}. Fresh copy ready!",
            image_count,
            if image_count == 1 { "" } else { "s" }
        ),
        "data": result,
    })))
}

pub async fn analyze_image(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Value>, AppError> {
    let mut upload = Upload::read(multipart).await?;
    let image = upload
        .take_files("image")
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidRequest("no image file provided".into()))?;

    let analysis = state.generator.analyze_image(&image).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Image analyzed successfully",
        "data": analysis,
    })))
}

async fn not_found() -> AppError {
    AppError::NotFound
}
