//! Membridge error types
//!
//! Transport and protocol failures are classified into a small closed
//! taxonomy so callers can display the original diagnostic verbatim.
//! `UnknownFormat` is the one non-fatal category: list-shaped operations
//! absorb it into an empty result instead of surfacing it.

use thiserror::Error;

/// Membridge error type
#[derive(Error, Debug)]
pub enum Error {
    /// The upstream returned a response with a non-success status
    #[error("API error ({status}): {detail}")]
    Api {
        /// HTTP status code carried by the response
        status: u16,
        /// Diagnostic body content, retained verbatim for display
        detail: String,
    },

    /// A request was sent but no response arrived
    #[error("Network error: unable to reach {target}")]
    Network {
        /// The URL the request was addressed to
        target: String,
    },

    /// Caller-side input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A response was received and decoded but its shape was not recognized
    #[error("Unrecognized upstream response format")]
    UnknownFormat,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error takes the silent empty-result degradation path
    pub fn is_absorbable(&self) -> bool {
        matches!(self, Error::UnknownFormat)
    }
}

/// Result type alias for membridge operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_retains_detail() {
        let err = Error::Api {
            status: 422,
            detail: "user_id must not be empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("user_id must not be empty"));
    }

    #[test]
    fn test_network_error_names_target() {
        let err = Error::Network {
            target: "http://localhost:8888/memories".to_string(),
        };
        assert!(err.to_string().contains("http://localhost:8888/memories"));
    }

    #[test]
    fn test_only_unknown_format_is_absorbable() {
        assert!(Error::UnknownFormat.is_absorbable());
        assert!(!Error::Validation("empty".into()).is_absorbable());
        assert!(!Error::Network { target: "x".into() }.is_absorbable());
        assert!(!Error::Api { status: 500, detail: String::new() }.is_absorbable());
    }
}
