//! Image generation, editing, and analysis.

use tracing::info;

use folio_core::models::generation::{AspectRatio, ImageSize};
use folio_core::models::image::InlineImage;

use crate::client::{GenerationBackend, ModelSet};
use crate::error::GenAiError;
use crate::wire::{
    Blob, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};

/// Returned by [`analyze_image`] when the model produced no text.
pub const NO_ANALYSIS: &str = "No analysis available.";

/// Generate an image from a text prompt.
pub async fn generate_image<B: GenerationBackend>(
    backend: &B,
    models: &ModelSet,
    prompt: &str,
    aspect_ratio: AspectRatio,
    image_size: ImageSize,
) -> Result<InlineImage, GenAiError> {
    let request = GenerateContentRequest::single_turn(vec![Part::text(prompt)]).with_config(
        GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio,
                image_size,
            }),
            ..Default::default()
        },
    );

    info!(
        aspect_ratio = aspect_ratio.as_str(),
        image_size = image_size.as_str(),
        "generating image"
    );

    let response = backend
        .generate_content(&models.image_generation, request)
        .await?;

    let blob = response.first_inline_data().ok_or(GenAiError::NoImage)?;
    decode_png(blob)
}

/// Apply a natural-language edit instruction to an image.
pub async fn edit_image<B: GenerationBackend>(
    backend: &B,
    models: &ModelSet,
    image: &InlineImage,
    instruction: &str,
) -> Result<InlineImage, GenAiError> {
    let request =
        GenerateContentRequest::single_turn(vec![Part::image(image), Part::text(instruction)]);

    info!(source_bytes = image.bytes.len(), "editing image");

    let response = backend
        .generate_content(&models.image_editing, request)
        .await?;

    let blob = response
        .first_inline_data()
        .ok_or(GenAiError::NoEditedImage)?;
    decode_png(blob)
}

/// Describe an image. An empty model answer is not an error.
pub async fn analyze_image<B: GenerationBackend>(
    backend: &B,
    models: &ModelSet,
    image: &InlineImage,
    prompt: &str,
) -> Result<String, GenAiError> {
    let request = GenerateContentRequest::single_turn(vec![Part::image(image), Part::text(prompt)]);

    let response: GenerateContentResponse = backend
        .generate_content(&models.image_analysis, request)
        .await?;

    Ok(response.text().unwrap_or_else(|| NO_ANALYSIS.to_string()))
}

/// Generated images are always delivered to the report as PNG.
fn decode_png(blob: &Blob) -> Result<InlineImage, GenAiError> {
    InlineImage::from_base64("image/png", &blob.data)
        .map_err(|e| GenAiError::ResponseParse(e.to_string()))
}
