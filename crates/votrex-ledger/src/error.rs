//! Ledger error types

use thiserror::Error;

/// Failure of a remote contract call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Ledger returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Contract rejected {function}: {reason}")]
    Rejected { function: String, reason: String },

    #[error("Failed to decode {function} result: {reason}")]
    Decode { function: String, reason: String },

    #[error("Unexpected {found} value for {function}")]
    UnexpectedValue {
        function: &'static str,
        found: &'static str,
    },
}

impl RemoteError {
    /// Malformed response from `function`.
    pub fn decode(function: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Failure loading a ledger fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Cannot read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid fixture entry: {0}")]
    Invalid(#[from] votrex_types::TypeError),
}

/// Result type for ledger calls
pub type Result<T> = std::result::Result<T, RemoteError>;
