//! Error types for the download module.
//!
//! Structured errors for every step of the fetch-and-persist pipeline,
//! carrying enough context (url, path, status) for diagnostic logging.

use std::path::PathBuf;

use thiserror::Error;

use super::validate::ValidationError;

/// Errors that can occur while processing a download request.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Unsafe subdirectory or filename rejected before any I/O.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors,
    /// connection dropped mid-stream, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server responded with a status other than 200.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error (directory creation, file create, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// Note: no `From<reqwest::Error>` or `From<std::io::Error>` conversions.
// The variants require context (url, path) that the source errors don't
// carry, so callers go through the helper constructors instead.
