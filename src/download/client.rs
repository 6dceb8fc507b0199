//! HTTP client wrapper for fetching files with streaming persistence.
//!
//! The client issues GET requests with fixed connect/read timeouts and
//! streams response bodies to disk, cleaning up partial files on failure.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;

/// Fixed HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fixed HTTP read timeout (10 seconds).
pub const READ_TIMEOUT_SECS: u64 = 10;

/// HTTP client for fetching files with streaming support.
///
/// Designed to be created once and reused across requests, taking advantage
/// of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the fixed default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a GET request and checks the response status.
    ///
    /// Only status 200 is treated as success; any other status aborts the
    /// request before a byte is persisted. Redirects are followed by the
    /// client before the status check.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails (network error, timeout)
    /// or the server responds with a status other than 200.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &Url) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url.as_str())
            } else {
                DownloadError::network(url.as_str(), e)
            }
        })?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }

        Ok(response)
    }

    /// Streams a response body to `path`.
    ///
    /// With `overwrite` false the file is opened with `create_new`, so a
    /// concurrent allocation of the same path surfaces as an IO error
    /// instead of silently clobbering the other download. On any failure
    /// after the file was created, the partial file is removed best-effort.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if opening the file, reading the body, or
    /// writing to disk fails.
    #[instrument(skip(self, response), fields(path = %path.display()))]
    pub async fn persist(
        &self,
        response: reqwest::Response,
        path: &Path,
        overwrite: bool,
    ) -> Result<u64, DownloadError> {
        let url = response.url().to_string();

        let file = if overwrite {
            File::create(path).await
        } else {
            tokio::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(path)
                .await
        }
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        match stream_to_file(file, response, &url, path).await {
            Ok(bytes_written) => Ok(bytes_written),
            Err(e) => {
                debug!(path = %path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(path).await;
                Err(e)
            }
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Streams the response body into the file chunk by chunk.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

    Ok(bytes_written)
}
