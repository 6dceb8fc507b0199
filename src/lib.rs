//! Fetchd Core Library
//!
//! This library provides the core functionality for the fetchd service,
//! which fetches files from HTTP(S) URLs on request and persists them
//! under a configured download directory, reporting completion or failure
//! on an event bus.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Service configuration (download directory resolution)
//! - [`download`] - Path validation, filename resolution, and streaming HTTP fetch
//! - [`events`] - Broadcast event bus for completion/failure notifications
//! - [`service`] - Request dispatch onto a bounded worker pool

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod events;
pub mod service;

// Re-export commonly used types
pub use config::{ConfigError, ServiceConfig, resolve_default_config_path};
pub use download::{DownloadError, HttpClient, ValidationError};
pub use events::{DownloadEvent, EventBus};
pub use service::{
    DEFAULT_CONCURRENCY, DownloadOutcome, DownloadRequest, DownloadService, MAX_CONCURRENCY,
    MIN_CONCURRENCY, ServiceError,
};
