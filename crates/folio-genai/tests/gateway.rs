use std::sync::Mutex;

use folio_core::models::generation::{AspectRatio, ImageSize};
use folio_core::models::image::InlineImage;
use folio_genai::client::{GenerationBackend, ModelSet, SharedBackend};
use folio_genai::error::GenAiError;
use folio_genai::image::{NO_ANALYSIS, analyze_image, edit_image, generate_image};
use folio_genai::speech::generate_speech;
use folio_genai::wire::{GenerateContentRequest, GenerateContentResponse};

/// Replays one canned response and records what it was asked.
struct CannedBackend {
    response: serde_json::Value,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl CannedBackend {
    fn new(response: serde_json::Value) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn only_call(&self) -> (String, serde_json::Value) {
        let calls = self.calls.lock().unwrap();
        assert_eq!(calls.len(), 1, "expected exactly one service call");
        calls[0].clone()
    }
}

impl GenerationBackend for CannedBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), serde_json::to_value(&request)?));
        Ok(serde_json::from_value(self.response.clone())?)
    }
}

struct FailingBackend;

impl GenerationBackend for FailingBackend {
    async fn generate_content(
        &self,
        _model: &str,
        _request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        Err(GenAiError::Invocation("HTTP 503".to_string()))
    }
}

fn inline_response(mime: &str, data: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "here you go" },
                { "inlineData": { "mimeType": mime, "data": data } }
            ]}
        }]
    })
}

fn photo() -> InlineImage {
    InlineImage::new("image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
}

#[tokio::test]
async fn generate_image_sends_prompt_and_image_config() {
    let backend = CannedBackend::new(inline_response("image/png", "AAEC"));
    let models = ModelSet::default();

    let image = generate_image(
        &backend,
        &models,
        "modern living room",
        AspectRatio::Cinematic21x9,
        ImageSize::Size4K,
    )
    .await
    .unwrap();

    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes, vec![0, 1, 2]);

    let (model, request) = backend.only_call();
    assert_eq!(model, models.image_generation);
    assert_eq!(request["contents"][0]["parts"][0]["text"], "modern living room");
    assert_eq!(request["generationConfig"]["imageConfig"]["aspectRatio"], "21:9");
    assert_eq!(request["generationConfig"]["imageConfig"]["imageSize"], "4K");
}

#[tokio::test]
async fn generate_image_without_payload_fails() {
    let backend = CannedBackend::new(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "I can't draw that" }] } }]
    }));

    let result = generate_image(
        &backend,
        &ModelSet::default(),
        "x",
        AspectRatio::Square,
        ImageSize::Size1K,
    )
    .await;

    assert!(matches!(result, Err(GenAiError::NoImage)));
}

#[tokio::test]
async fn edit_image_sends_source_image_first() {
    let backend = CannedBackend::new(inline_response("image/png", "AAEC"));
    let models = ModelSet::default();

    edit_image(&backend, &models, &photo(), "add a retro filter")
        .await
        .unwrap();

    let (model, request) = backend.only_call();
    assert_eq!(model, models.image_editing);
    let parts = &request["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], photo().to_base64());
    assert_eq!(parts[1]["text"], "add a retro filter");
}

#[tokio::test]
async fn edit_image_without_payload_fails() {
    let backend = CannedBackend::new(serde_json::json!({ "candidates": [] }));
    let result = edit_image(&backend, &ModelSet::default(), &photo(), "remove the chair").await;
    assert!(matches!(result, Err(GenAiError::NoEditedImage)));
}

#[tokio::test]
async fn analyze_image_returns_text() {
    let backend = CannedBackend::new(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "A bright two-bedroom flat." }] } }]
    }));

    let text = analyze_image(&backend, &ModelSet::default(), &photo(), "Describe this property")
        .await
        .unwrap();

    assert_eq!(text, "A bright two-bedroom flat.");
}

#[tokio::test]
async fn analyze_image_falls_back_when_no_text() {
    let backend = CannedBackend::new(serde_json::json!({}));
    let text = analyze_image(&backend, &ModelSet::default(), &photo(), "Describe")
        .await
        .unwrap();
    assert_eq!(text, NO_ANALYSIS);
}

#[tokio::test]
async fn speech_decodes_pcm_and_requests_audio() {
    // Two samples: 1 and -2.
    let backend = CannedBackend::new(serde_json::json!({
        "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AQD+/w==" } }
        ]}}]
    }));
    let models = ModelSet::default();

    let audio = generate_speech(&backend, &models, "Welcome to the report")
        .await
        .unwrap();

    assert_eq!(audio.samples, vec![1, -2]);
    assert_eq!(audio.sample_rate, 24_000);

    let (model, request) = backend.only_call();
    assert_eq!(model, models.speech);
    assert_eq!(request["generationConfig"]["responseModalities"][0], "AUDIO");
    assert_eq!(
        request["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
            ["voiceName"],
        "Puck"
    );
}

#[tokio::test]
async fn speech_without_audio_fails() {
    let backend = CannedBackend::new(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "no" }] } }]
    }));
    let result = generate_speech(&backend, &ModelSet::default(), "hello").await;
    assert!(matches!(result, Err(GenAiError::NoAudio)));
}

#[tokio::test]
async fn service_errors_propagate_unchanged() {
    let result = analyze_image(&FailingBackend, &ModelSet::default(), &photo(), "x").await;
    assert!(matches!(result, Err(GenAiError::Invocation(msg)) if msg == "HTTP 503"));
}

#[tokio::test]
async fn shared_backend_delegates_to_the_wrapped_backend() {
    let shared = SharedBackend::new(CannedBackend::new(inline_response("image/webp", "AAEC")));
    let image = edit_image(&shared.clone(), &ModelSet::default(), &photo(), "brighter")
        .await
        .unwrap();
    assert_eq!(image.bytes, vec![0, 1, 2]);

    let failing = SharedBackend::new(FailingBackend);
    let result = generate_speech(&failing, &ModelSet::default(), "hi").await;
    assert!(matches!(result, Err(GenAiError::Invocation(_))));
}
