use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Type tag of a notice, used by presentation layers to pick styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Plain informational notice (default)
    #[default]
    Info,
    /// An operation completed successfully
    Success,
    /// Something failed
    Error,
    /// Rendered by a caller-supplied component
    Custom,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Custom => "custom",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown kind name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown notice kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for NoticeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(NoticeKind::Info),
            "success" => Ok(NoticeKind::Success),
            "error" => Ok(NoticeKind::Error),
            "custom" => Ok(NoticeKind::Custom),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}
