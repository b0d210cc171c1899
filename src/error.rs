use std::fmt;
use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

/// A single structural problem found in a generated collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the collection, empty for the collection itself
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every violation found while validating a collection. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.violations.iter().join("\n"))
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a PDF document")]
    NotPdf(PathBuf),

    #[error("document is {size} bytes, the inline upload limit is {limit} bytes")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("no API key found, set the {0} environment variable")]
    MissingApiKey(String),

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response stream broke off: {0}")]
    Stream(#[source] std::io::Error),

    #[error("inference backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("model output is not a JSON array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("generated content failed validation:\n{0}")]
    Schema(#[from] SchemaError),

    #[error("generation cancelled")]
    Cancelled,
}
