//! Errors raised by the core model.

/// Errors from locator validation, environment mapping and keyword parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid source locator: {0}")]
    InvalidLocator(String),
    #[error("unknown deploy environment: '{0}'")]
    UnknownEnvironment(String),
    #[error("invalid {kind} value: '{value}'")]
    InvalidValue { kind: &'static str, value: String },
}
