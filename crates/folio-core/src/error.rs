use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("unknown aspect ratio: {0}")]
    UnknownAspectRatio(String),

    #[error("unknown image size: {0}")]
    UnknownImageSize(String),

    #[error("logo is not in the saved library")]
    LogoNotSaved,

    #[error("property not found: {0}")]
    PropertyNotFound(String),

    #[error("duplicate property id: {0}")]
    DuplicatePropertyId(String),
}
