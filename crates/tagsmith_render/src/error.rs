//! Error types for rendering.

use std::path::PathBuf;
use thiserror::Error;

use crate::stacks::FrameKind;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that abort a render call.
///
/// Unresolved placeholders, unknown tags and malformed query pairs are not
/// errors; they are absorbed where they occur.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Tag <{tag}> requires attribute '{attribute}'")]
    MissingAttribute { tag: String, attribute: String },

    #[error("Unbalanced markup: closing {0} with no open frame")]
    StackUnderflow(FrameKind),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub(crate) fn missing_attribute(tag: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        }
    }
}
