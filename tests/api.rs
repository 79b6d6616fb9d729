mod common;

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{Reply, ScriptedClient, MODEL_ID, WELL_FORMED};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use wordsnap::{
    routes::{router, AppState},
    DescriptionGenerator, GenerationSettings, ModelError,
};

const BOUNDARY: &str = "wordsnap-test-boundary";

fn app(client: Arc<ScriptedClient>) -> Router {
    let settings = GenerationSettings { backoff: Duration::ZERO, ..Default::default() };
    let state = AppState { generator: Arc::new(DescriptionGenerator::new(client, settings)) };
    router(state, CorsLayer::permissive())
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, mime, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\n\
                         Content-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post(app: Router, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart(parts)))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

#[tokio::test]
async fn health_reports_model() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(ScriptedClient::always("")), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["model"], MODEL_ID);
}

#[tokio::test]
async fn generate_returns_descriptions_and_metadata() {
    let client = ScriptedClient::new(vec![Reply::text(WELL_FORMED)]);
    let (status, body) = post(
        app(client.clone()),
        "/api/generate",
        &[
            Part::Text("productName", "Wireless Headphones"),
            Part::Text("condition", "used-good"),
            Part::Text("tone", "casual"),
            Part::File("images", "image/jpeg", JPEG),
            Part::File("images", "image/png", JPEG),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Analyzed 2 images. Fresh copy ready!");
    let result = &body["data"];
    assert_eq!(result["metadata"]["retries"], 0);
    assert_eq!(result["metadata"]["imageCount"], 2);
    assert_eq!(result["metadata"]["condition"], "used-good");
    assert_eq!(result["metadata"]["tone"], "casual");
    assert_eq!(result["metadata"]["model"], MODEL_ID);
    assert_eq!(result["data"]["bullets"].as_array().unwrap().len(), 5);
    assert_eq!(result["data"]["keywords"][0], "wireless headphones");

    let calls = client.calls();
    assert_eq!(calls[0].image_count, 2);
    assert!(calls[0].prompt.contains("Analyze all 2 product images."));
}

#[tokio::test]
async fn unknown_tone_is_accepted_as_professional() {
    let client = ScriptedClient::new(vec![Reply::text(WELL_FORMED)]);
    let (status, body) = post(
        app(client.clone()),
        "/api/generate",
        &[
            Part::Text("productName", "Desk Lamp"),
            Part::Text("tone", "sarcastic"),
            Part::File("images", "image/jpeg", JPEG),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metadata"]["tone"], "professional");
    assert!(client.calls()[0].prompt.contains("Use professional, informative language."));
}

#[tokio::test]
async fn missing_product_name_is_rejected() {
    let client = ScriptedClient::always(WELL_FORMED);
    let (status, body) =
        post(app(client.clone()), "/api/generate", &[Part::File("images", "image/jpeg", JPEG)]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"].as_str().unwrap().contains("product name is required"));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn missing_images_are_rejected() {
    let (status, body) =
        post(app(ScriptedClient::always(WELL_FORMED)), "/api/generate", &[Part::Text("productName", "Lamp")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("no image files provided"));
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let (status, _) = post(
        app(ScriptedClient::always(WELL_FORMED)),
        "/api/generate",
        &[Part::Text("productName", "Lamp"), Part::File("images", "application/pdf", b"%PDF-1.4")],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_condition_is_rejected() {
    let (status, body) = post(
        app(ScriptedClient::always(WELL_FORMED)),
        "/api/generate",
        &[
            Part::Text("productName", "Lamp"),
            Part::Text("condition", "broken"),
            Part::File("images", "image/jpeg", JPEG),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("unknown condition"));
}

#[tokio::test]
async fn exhausted_model_failures_map_to_bad_gateway() {
    let client = ScriptedClient::new(vec![
        Reply::Fail(ModelError::Unavailable("status=503".into())),
        Reply::Fail(ModelError::Unavailable("status=503".into())),
    ]);
    let (status, body) = post(
        app(client),
        "/api/generate",
        &[Part::Text("productName", "Lamp"), Part::File("images", "image/jpeg", JPEG)],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"].as_str().unwrap().contains("after 2 attempts"));
}

#[tokio::test]
async fn analyze_returns_structured_features() {
    let client = ScriptedClient::always("{\"category\": \"Lamp\", \"colors\": [\"brass\"], \"useCase\": \"reading\"}");
    let (status, body) = post(app(client), "/api/generate/analyze", &[Part::File("image", "image/jpeg", JPEG)]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], "Lamp");
    assert_eq!(body["data"]["useCase"], "reading");
}

#[tokio::test]
async fn analyze_requires_an_image() {
    let (status, _) =
        post(app(ScriptedClient::always("{}")), "/api/generate/analyze", &[Part::Text("note", "nothing")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let request = Request::get("/api/nope").body(Body::empty()).unwrap();
    let (status, body) = send(app(ScriptedClient::always("")), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
