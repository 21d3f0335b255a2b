//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Transport Errors
    // ─────────────────────────────────────────────────────────────
    #[error("HTTP transport error: {message}")]
    Transport { message: String },

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid session credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Settings store error: {message}")]
    Store { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::store("disk full");
        assert_eq!(err.to_string(), "Settings store error: disk full");

        let err = Error::invalid_credentials("access token is empty");
        assert!(err.to_string().contains("access token is empty"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_url_mentions_url() {
        let err = Error::invalid_url("not a url", "relative URL without a base");
        assert!(err.to_string().contains("not a url"));
        assert!(err.to_string().contains("relative URL"));
    }

    #[test]
    fn test_context_preserves_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("writing session file").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_with_context_is_lazy_on_success() {
        let result: std::result::Result<u8, std::io::Error> = Ok(7);
        let value = result
            .with_context(|| panic!("context built for a successful result"))
            .unwrap();
        assert_eq!(value, 7);
    }
}
