use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which of the two form fields a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Local,
    Remote,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameField::Local => f.write_str("local"),
            NameField::Remote => f.write_str("remote"),
        }
    }
}

/// Failures a transfer backend can report for a single retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("no active connection")]
    NoActiveConnection,

    #[error("remote file not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e.to_string())
    }
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            TransferError::Other(e.to_string())
        } else {
            TransferError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{0} file name must not be empty")]
    EmptyName(NameField),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}
