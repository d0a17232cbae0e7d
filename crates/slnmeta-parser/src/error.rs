//! Parser errors.

use slnmeta_core::error::ModelError;

/// Errors from any of the document parsers. None of them are recovered inside a parser.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A required argument (content, file name) was blank.
    #[error("invalid input: {0} must not be blank")]
    InvalidInput(&'static str),
    /// Well-formed content with an unexpected value.
    #[error("malformed content: {0}")]
    Malformed(String),
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ModelError> for ParseError {
    fn from(err: ModelError) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// Reject blank required arguments.
pub(crate) fn require(value: &str, what: &'static str) -> Result<(), ParseError> {
    if value.trim().is_empty() {
        return Err(ParseError::InvalidInput(what));
    }
    Ok(())
}
