use thiserror::Error;

/// Validation errors raised while parsing client input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instrument id must be a positive integer: '{value}'")]
    InvalidInstrumentId { value: String },

    #[error("unknown route '{path}'")]
    UnknownRoute { path: String },

    #[error("not a recognized timestamp: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("role must be USER or ADMIN: '{value}'")]
    InvalidRole { value: String },
}
