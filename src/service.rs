//! Request dispatch: one bounded background task per download request.
//!
//! The service owns all per-request context explicitly (configuration, HTTP
//! client, event bus, concurrency semaphore); nothing is closed over as
//! global state. Dispatch is fire-and-forget from the caller's perspective:
//! failures never propagate back synchronously, they surface as
//! `download_failed` events plus a diagnostic log line.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ServiceConfig;
use crate::download::{
    DownloadError, HttpClient, allocate_path, resolve_filename, validate_filename, validate_subdir,
};
use crate::events::{DownloadEvent, EventBus};

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Error type for service construction.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// A single download request. Immutable once accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadRequest {
    /// Source URL to fetch.
    pub url: String,
    /// Relative subdirectory under the configured download directory.
    #[serde(default)]
    pub subdir: Option<String>,
    /// Overrides the derived filename.
    #[serde(default)]
    pub filename: Option<String>,
    /// Skip collision-avoidance renaming and overwrite the target path.
    #[serde(default)]
    pub overwrite: bool,
}

impl DownloadRequest {
    /// Creates a request for `url` with all optional fields unset.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subdir: None,
            filename: None,
            overwrite: false,
        }
    }
}

/// Result of a successfully completed download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Final path of the persisted file.
    pub path: PathBuf,
    /// Filename the file was saved under.
    pub filename: String,
    /// Number of body bytes written.
    pub bytes_written: u64,
}

/// Dispatches download requests onto a bounded pool of background tasks.
///
/// Each request runs through the same pipeline: validate the subdirectory
/// and any explicit filename, fetch the URL, resolve the filename, allocate
/// a destination path, stream the body to disk. The terminal state is
/// reported on the event bus as `download_completed` or `download_failed`.
#[derive(Debug, Clone)]
pub struct DownloadService {
    config: Arc<ServiceConfig>,
    client: HttpClient,
    events: EventBus,
    semaphore: Arc<Semaphore>,
}

impl DownloadService {
    /// Creates a service with the default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConcurrency`] if `concurrency` is
    /// outside `1..=100`.
    pub fn new(config: ServiceConfig, concurrency: usize) -> Result<Self, ServiceError> {
        Self::with_client(config, concurrency, HttpClient::new())
    }

    /// Creates a service with a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConcurrency`] if `concurrency` is
    /// outside `1..=100`.
    pub fn with_client(
        config: ServiceConfig,
        concurrency: usize,
        client: HttpClient,
    ) -> Result<Self, ServiceError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ServiceError::InvalidConcurrency { value: concurrency });
        }

        Ok(Self {
            config: Arc::new(config),
            client,
            events: EventBus::new(),
            semaphore: Arc::new(Semaphore::new(concurrency)),
        })
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Subscribes to completion/failure events.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DownloadEvent> {
        self.events.subscribe()
    }

    /// Dispatches a request onto a background task and returns immediately.
    ///
    /// The task waits for a concurrency permit, runs the pipeline, and emits
    /// exactly one terminal event. The returned handle can be awaited by
    /// callers that want to observe completion; the event bus is the only
    /// result surface.
    pub fn dispatch(&self, request: DownloadRequest) -> JoinHandle<()> {
        let config = Arc::clone(&self.config);
        let client = self.client.clone();
        let events = self.events.clone();
        let semaphore = Arc::clone(&self.semaphore);

        tokio::spawn(async move {
            // Permit is dropped when this block exits (RAII)
            let Ok(_permit) = semaphore.acquire_owned().await else {
                // Semaphore closed: service is shutting down
                return;
            };

            let url = request.url.clone();
            let mut resolved_name = request.filename.clone();

            match process(&config, &client, &request, &mut resolved_name).await {
                Ok(outcome) => {
                    info!(
                        url = %url,
                        path = %outcome.path.display(),
                        bytes = outcome.bytes_written,
                        "download completed"
                    );
                    events.emit(DownloadEvent::DownloadCompleted {
                        url,
                        filename: outcome.filename,
                    });
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "download failed");
                    events.emit(DownloadEvent::DownloadFailed {
                        url,
                        filename: resolved_name,
                    });
                }
            }
        })
    }
}

/// Per-request pipeline: validate, fetch, resolve name, allocate, persist.
///
/// `resolved_name` is updated as soon as filename resolution completes so
/// that a later failure still reports the filename in its event.
async fn process(
    config: &ServiceConfig,
    client: &HttpClient,
    request: &DownloadRequest,
    resolved_name: &mut Option<String>,
) -> Result<DownloadOutcome, DownloadError> {
    let subdir = request.subdir.as_deref().unwrap_or("");
    validate_subdir(subdir)?;
    if let Some(name) = request.filename.as_deref() {
        validate_filename(name)?;
    }

    let url = Url::parse(&request.url).map_err(|_| DownloadError::invalid_url(&request.url))?;

    let response = client.get(&url).await?;

    let content_disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let filename = resolve_filename(
        request.filename.as_deref(),
        content_disposition.as_deref(),
        &url,
    );
    *resolved_name = Some(filename.clone());
    validate_filename(&filename)?;

    let path = allocate_path(config.download_dir(), subdir, &filename, request.overwrite)
        .map_err(|e| DownloadError::io(config.download_dir().join(subdir), e))?;

    debug!(url = %request.url, path = %path.display(), "resolved destination");

    let bytes_written = client.persist(response, &path, request.overwrite).await?;

    Ok(DownloadOutcome {
        path,
        filename,
        bytes_written,
    })
}
