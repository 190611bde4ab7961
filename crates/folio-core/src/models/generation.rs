//! Parameters accepted by the image generation service.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Cinematic21x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 8] = [
        Self::Square,
        Self::Portrait2x3,
        Self::Landscape3x2,
        Self::Portrait3x4,
        Self::Landscape4x3,
        Self::Portrait9x16,
        Self::Landscape16x9,
        Self::Cinematic21x9,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait2x3 => "2:3",
            Self::Landscape3x2 => "3:2",
            Self::Portrait3x4 => "3:4",
            Self::Landscape4x3 => "4:3",
            Self::Portrait9x16 => "9:16",
            Self::Landscape16x9 => "16:9",
            Self::Cinematic21x9 => "21:9",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAspectRatio(s.to_string()))
    }
}

/// Output resolution tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    Size1K,
    #[serde(rename = "2K")]
    Size2K,
    #[serde(rename = "4K")]
    Size4K,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [Self::Size1K, Self::Size2K, Self::Size4K];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size1K => "1K",
            Self::Size2K => "2K",
            Self::Size4K => "4K",
        }
    }
}

impl FromStr for ImageSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownImageSize(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_wire_names() {
        for ratio in AspectRatio::ALL {
            let json = serde_json::to_string(&ratio).unwrap();
            assert_eq!(json, format!("\"{}\"", ratio.as_str()));
        }
        assert_eq!(serde_json::to_string(&ImageSize::Size4K).unwrap(), "\"4K\"");
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape16x9);
        assert!("5:4".parse::<AspectRatio>().is_err());
        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::Size2K);
        assert!("8K".parse::<ImageSize>().is_err());
    }
}
