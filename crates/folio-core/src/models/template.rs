use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the three fixed visual layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTemplate {
    #[default]
    Classic,
    Modern,
    Minimal,
}

impl ReportTemplate {
    pub const ALL: [ReportTemplate; 3] = [Self::Classic, Self::Modern, Self::Minimal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for ReportTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportTemplate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "classic" => Ok(Self::Classic),
            "modern" => Ok(Self::Modern),
            "minimal" => Ok(Self::Minimal),
            other => Err(CoreError::UnknownTemplate(other.to_string())),
        }
    }
}
