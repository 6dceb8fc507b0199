//! HTTP fetch-and-persist pipeline building blocks.
//!
//! This module provides the pieces the service composes per request:
//!
//! - Path safety validation (traversal, absolute paths, reserved characters)
//! - Filename resolution (explicit name, Content-Disposition header, URL path)
//! - Path allocation with collision-avoiding numeric suffixes
//! - Streaming download to disk with partial-file cleanup on failure
//!
//! # Example
//!
//! ```no_run
//! use fetchd_core::download::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let url = url::Url::parse("https://example.com/file.pdf")?;
//! let response = client.get(&url).await?;
//! client.persist(response, Path::new("./downloads/file.pdf"), false).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod filename;
mod path;
mod validate;

pub use client::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use filename::resolve_filename;
pub(crate) use path::allocate_path;
pub use validate::{ValidationError, validate_filename, validate_subdir};
