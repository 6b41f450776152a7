//! Extraction of display text from error values
//!
//! Errors may optionally expose richer detail text and structured data
//! through [`Exception::details`]. When present it takes precedence over
//! the plain `Display` message.

use serde_json::Value;
use std::{borrow::Cow, fmt};

/// Rich detail carried by an error
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    /// Human readable detail, preferred over the error's own message
    pub text: String,
    /// Structured payload attached to the resulting notice
    pub data: Option<Value>,
}

/// An error value the notice manager can describe and report
pub trait Exception: fmt::Debug + fmt::Display + Send + Sync {
    /// Short type name used as the fallback title
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(std::any::type_name::<Self>()))
    }

    fn details(&self) -> Option<ErrorDetails> {
        None
    }
}

/// Display fields extracted from an [`Exception`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionSummary {
    pub name: String,
    pub message: String,
    pub details: Option<Value>,
}

/// Prefer detail text, then the Display message, then the type name.
pub fn describe(exception: &dyn Exception) -> ExceptionSummary {
    let name = exception.name().into_owned();
    let details = exception.details();

    let message = match &details {
        Some(d) if !d.text.is_empty() => d.text.clone(),
        _ => {
            let display = exception.to_string();
            if display.is_empty() {
                name.clone()
            } else {
                display
            }
        }
    };

    ExceptionSummary {
        name,
        message,
        details: details.and_then(|d| d.data),
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// An error that carries detail text and an optional structured payload
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedError {
    pub name: String,
    pub message: String,
    pub details: ErrorDetails,
}

impl DetailedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            details: ErrorDetails {
                text: text.into(),
                data: None,
            },
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.details.data = Some(data);
        self
    }
}

impl fmt::Display for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DetailedError {}

impl Exception for DetailedError {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn details(&self) -> Option<ErrorDetails> {
        Some(self.details.clone())
    }
}

impl Exception for anyhow::Error {
    fn name(&self) -> Cow<'_, str> {
        match self.downcast_ref::<DetailedError>() {
            Some(detailed) => Cow::Borrowed(&detailed.name),
            None => Cow::Borrowed("Error"),
        }
    }

    fn details(&self) -> Option<ErrorDetails> {
        self.downcast_ref::<DetailedError>()
            .map(|detailed| detailed.details.clone())
    }
}

impl Exception for std::io::Error {}

impl Exception for serde_json::Error {}
