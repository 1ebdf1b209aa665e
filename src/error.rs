//! Error types for nav-guidance
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (Config, Network, Decode, etc.)
//! - A `Result` alias used throughout the crate
//!
//! Errors raised inside background tasks are classified and reported through
//! the fetch outcome or the tracing log rather than propagated as panics.

use thiserror::Error;

/// Result type alias for nav-guidance operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nav-guidance
///
/// Each variant carries enough context to diagnose the failure in logs. The
/// variants also serve as the internal classification behind the single
/// generic failure message delivered to fetch callers, so a decode problem
/// stays distinguishable from a transport problem even though both surface
/// the same way.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (e.g., the HTTP client could not be built)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error from the HTTP transport
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Guidance image URL could not be parsed
    #[error("invalid guidance image URL: {0}")]
    InvalidUrl(String),

    /// Image bytes could not be decoded into a bitmap
    #[error("image decode error: {0}")]
    Decode(String),

    /// Notification sink rejected or failed an operation
    #[error("notification sink error: {0}")]
    Notification(String),
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let err = Error::Config("request timeout must be non-zero".into());
        assert_eq!(
            err.to_string(),
            "configuration error: request timeout must be non-zero"
        );

        let err = Error::InvalidUrl("htp:/broken".into());
        assert_eq!(err.to_string(), "invalid guidance image URL: htp:/broken");

        let err = Error::Decode("unsupported image format".into());
        assert_eq!(err.to_string(), "image decode error: unsupported image format");

        let err = Error::Notification("channel closed".into());
        assert_eq!(err.to_string(), "notification sink error: channel closed");
    }

    #[test]
    fn result_alias_propagates_with_question_mark() {
        fn inner() -> Result<u32> {
            Err(Error::Decode("truncated body".into()))
        }

        fn outer() -> Result<u32> {
            let value = inner()?;
            Ok(value)
        }

        let err = outer().unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
