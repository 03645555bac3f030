use std::panic::Location;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BagError {
    #[error("Attribute store must be a mapping, got {found}")]
    Configuration { found: &'static str },

    #[error("Undefined {method} method")]
    UndefinedOperation { method: String },

    #[error("{operation}(): {message} in {}:{}", location.file(), location.line())]
    Operation {
        operation: &'static str,
        message: String,
        location: &'static Location<'static>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl BagError {
    pub(crate) fn undefined(method: impl Into<String>) -> Self {
        BagError::UndefinedOperation {
            method: method.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BagError>;

/// Failure raised inside a catalog handler, before the dispatcher attaches
/// the operation name and the caller's location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct OpError(pub String);

impl OpError {
    pub fn new(message: impl Into<String>) -> Self {
        OpError(message.into())
    }
}

pub type OpResult<T> = std::result::Result<T, OpError>;
