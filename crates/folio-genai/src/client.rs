//! Transport to the generation service.
//!
//! The gateway operations in [`crate::image`] and [`crate::speech`] are
//! generic over [`GenerationBackend`] so that response handling can be
//! exercised without network access. [`GeminiClient`] is the production
//! backend: blocking HTTP via `ureq`, moved onto tokio's blocking pool.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GenAiError;
use crate::wire::{GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Anything that can answer a `generateContent` call for a named model.
pub trait GenerationBackend: Send + Sync {
    fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse, GenAiError>> + Send;
}

type BoxedResponse<'a> =
    Pin<Box<dyn Future<Output = Result<GenerateContentResponse, GenAiError>> + Send + 'a>>;

/// Object-safe form of [`GenerationBackend`], implemented for every backend.
pub trait DynGenerationBackend: Send + Sync {
    fn generate_content_boxed<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
    ) -> BoxedResponse<'a>;
}

impl<T: GenerationBackend> DynGenerationBackend for T {
    fn generate_content_boxed<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
    ) -> BoxedResponse<'a> {
        Box::pin(self.generate_content(model, request))
    }
}

/// A cheaply cloneable handle to any backend, for shared application state.
#[derive(Clone)]
pub struct SharedBackend(Arc<dyn DynGenerationBackend>);

impl SharedBackend {
    pub fn new(backend: impl GenerationBackend + 'static) -> Self {
        Self(Arc::new(backend))
    }
}

impl GenerationBackend for SharedBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        self.0.generate_content_boxed(model, request).await
    }
}

/// Model assignment per gateway operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSet {
    pub image_generation: String,
    pub image_editing: String,
    pub image_analysis: String,
    pub speech: String,
    /// Prebuilt voice used for speech synthesis.
    pub voice: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            image_generation: "gemini-3-pro-image-preview".to_string(),
            image_editing: "gemini-2.5-flash-image".to_string(),
            image_analysis: "gemini-3-pro-preview".to_string(),
            speech: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Puck".to_string(),
        }
    }
}

/// Service endpoint settings, persisted in the editor config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Largest response body read from the service. A 4K image arrives as
    /// base64 inside the JSON body.
    pub max_response_bytes: u64,
    pub models: ModelSet,
}

impl Default for GenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
            max_response_bytes: 64 * 1024 * 1024,
            models: ModelSet::default(),
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    max_response_bytes: u64,
}

impl GeminiClient {
    /// Build a client. An empty API key is a configuration error.
    pub fn new(api_key: impl Into<String>, settings: &GenAiSettings) -> Result<Self, GenAiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenAiError::Config("API key not found".to_string()));
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.request_timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_response_bytes: settings.max_response_bytes,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

impl GenerationBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let body = serde_json::to_vec(&request)?;
        let url = self.endpoint(model);
        let agent = self.agent.clone();
        let api_key = self.api_key.clone();
        let limit = self.max_response_bytes;

        info!(model, request_bytes = body.len(), "invoking generation model");

        let raw = tokio::task::spawn_blocking(move || -> Result<String, GenAiError> {
            let mut response = agent
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("content-type", "application/json")
                .send(&body[..])
                .map_err(|e| GenAiError::Invocation(e.to_string()))?;

            response
                .body_mut()
                .with_config()
                .limit(limit)
                .read_to_string()
                .map_err(|e| GenAiError::ResponseParse(e.to_string()))
        })
        .await
        .map_err(|e| GenAiError::Invocation(format!("request task failed: {e}")))??;

        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GenAiError::ResponseParse(e.to_string()))?;

        info!(
            model,
            candidates = parsed.candidates.len(),
            "generation model responded"
        );

        Ok(parsed)
    }
}
