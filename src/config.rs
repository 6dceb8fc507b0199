//! Service configuration: download directory loading and resolution.
//!
//! Configuration is loaded once at startup and is read-only afterwards.
//! The only required setting is the download directory; startup fails if
//! the resolved directory does not exist, and the service does not activate.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading or validating service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read from disk.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file contains a line that could not be parsed.
    #[error("invalid config syntax in {path} on line {line}: {message}")]
    Syntax {
        /// Path of the config file.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Config file does not set the required `download_dir` key.
    #[error("missing required `download_dir` in {path}")]
    MissingDownloadDir {
        /// Path of the config file.
        path: PathBuf,
    },

    /// The resolved download directory does not exist on disk.
    #[error("download directory {path} does not exist; service not activated")]
    DirectoryNotFound {
        /// The resolved directory path.
        path: PathBuf,
    },
}

/// Process-wide service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    download_dir: PathBuf,
}

impl ServiceConfig {
    /// Builds a configuration from a download directory.
    ///
    /// A relative `download_dir` is resolved against `base_dir`. The
    /// directory must already exist; it is never created here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the resolved directory
    /// is missing or is not a directory.
    pub fn new(download_dir: impl Into<PathBuf>, base_dir: &Path) -> Result<Self, ConfigError> {
        let download_dir: PathBuf = download_dir.into();
        let resolved = if download_dir.is_absolute() {
            download_dir
        } else {
            base_dir.join(download_dir)
        };

        if !resolved.is_dir() {
            return Err(ConfigError::DirectoryNotFound { path: resolved });
        }

        Ok(Self {
            download_dir: resolved,
        })
    }

    /// Loads configuration from a `key = "value"` config file.
    ///
    /// Recognized keys:
    /// - `download_dir` (required) - quoted string path
    ///
    /// Blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, contains invalid
    /// syntax or unknown keys, omits `download_dir`, or names a directory
    /// that does not exist.
    pub fn load(path: &Path, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut download_dir: Option<String> = None;

        for (line_index, raw_line) in raw.lines().enumerate() {
            let line = strip_inline_comment(raw_line).trim().to_string();
            if line.is_empty() {
                continue;
            }

            let Some((raw_key, raw_value)) = line.split_once('=') else {
                return Err(ConfigError::Syntax {
                    path: path.to_path_buf(),
                    line: line_index + 1,
                    message: "expected key = value".to_string(),
                });
            };

            let key = raw_key.trim();
            let value = raw_value.trim();

            match key {
                "download_dir" => {
                    let parsed =
                        parse_string_literal(value).ok_or_else(|| ConfigError::Syntax {
                            path: path.to_path_buf(),
                            line: line_index + 1,
                            message: "expected a quoted string for `download_dir`".to_string(),
                        })?;
                    download_dir = Some(parsed);
                }
                other => {
                    return Err(ConfigError::Syntax {
                        path: path.to_path_buf(),
                        line: line_index + 1,
                        message: format!("unknown key `{other}`"),
                    });
                }
            }
        }

        let Some(download_dir) = download_dir else {
            return Err(ConfigError::MissingDownloadDir {
                path: path.to_path_buf(),
            });
        };

        Self::new(download_dir, base_dir)
    }

    /// Returns the resolved download directory.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/fetchd/config.toml`
/// 2. `$HOME/.config/fetchd/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("fetchd")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("fetchd")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Strips a `#` comment unless it appears inside a quoted value.
fn strip_inline_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (index, ch) in line.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), c) if c == open => quote = None,
            (None, '#') => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Parses a single- or double-quoted string literal.
fn parse_string_literal(value: &str) -> Option<String> {
    let value = value.trim();
    let mut chars = value.chars();
    let open = chars.next()?;
    if open != '"' && open != '\'' {
        return None;
    }
    let close = value.chars().next_back()?;
    if close != open || value.len() < 2 {
        return None;
    }
    Some(value[1..value.len() - 1].to_string())
}
