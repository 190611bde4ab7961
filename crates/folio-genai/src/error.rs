use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("generation request failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("no image generated")]
    NoImage,

    #[error("no edited image returned")]
    NoEditedImage,

    #[error("no audio generated")]
    NoAudio,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
