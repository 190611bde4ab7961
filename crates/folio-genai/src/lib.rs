//! folio-genai
//!
//! Calls to the external generative service: image generation, image
//! editing, image analysis, and text-to-speech.

pub mod client;
pub mod error;
pub mod image;
pub mod speech;
pub mod wire;
