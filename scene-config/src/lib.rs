//! Configuration for Scene Forge.
//!
//! Settings are resolved from, in increasing priority: built-in defaults, the
//! process environment (optionally seeded from a `.env` file), and explicit
//! overrides such as command-line flags. A missing credential is fatal; the
//! remaining settings fall back to defaults and are validated before use.

#![warn(missing_docs, clippy::pedantic)]

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scene_adapters::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GEMINI_API_KEY_ENV, GeminiConfig};
use thiserror::Error;
use tracing::{debug, warn};

/// Fallback credential variable accepted when [`GEMINI_API_KEY_ENV`] is unset.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";
/// Model identifier override.
pub const MODEL_ENV: &str = "SCENE_FORGE_MODEL";
/// API base URL override.
pub const BASE_URL_ENV: &str = "SCENE_FORGE_BASE_URL";
/// Transport timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "SCENE_FORGE_TIMEOUT_SECS";
/// Directory exports are written to.
pub const OUTPUT_DIR_ENV: &str = "SCENE_FORGE_OUTPUT_DIR";

/// Transport timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while resolving configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// No API key was found.
    #[error("missing API credential: set {primary} (or {fallback})")]
    MissingCredential {
        /// Preferred variable name.
        primary: &'static str,
        /// Accepted fallback variable name.
        fallback: &'static str,
    },

    /// A numeric setting could not be parsed.
    #[error("invalid value `{value}` for {name}")]
    InvalidNumber {
        /// Setting name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// The timeout was zero.
    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    /// The base URL is not an http(s) URL.
    #[error("base URL `{value}` must start with http:// or https://")]
    InvalidBaseUrl {
        /// Rejected value.
        value: String,
    },

    /// The model identifier was blank.
    #[error("model identifier must not be empty")]
    EmptyModel,

    /// The sampling temperature was out of range.
    #[error("temperature {value} must be between 0.0 and 2.0")]
    InvalidTemperature {
        /// Rejected value.
        value: f32,
    },

    /// The adapter rejected the resolved settings.
    #[error("adapter configuration rejected: {reason}")]
    Adapter {
        /// Adapter error message.
        reason: String,
    },
}

/// Explicit values that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Model identifier.
    pub model: Option<String>,
    /// API base URL.
    pub base_url: Option<String>,
    /// Transport timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Export directory.
    pub output_dir: Option<PathBuf>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

/// Fully resolved settings for the studio.
#[derive(Clone, PartialEq)]
pub struct StudioConfig {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    output_dir: PathBuf,
    temperature: Option<f32>,
}

impl fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("output_dir", &self.output_dir)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl StudioConfig {
    /// Resolves from the process environment. Call [`load_dotenv`] first to
    /// pick up a `.env` file.
    ///
    /// # Errors
    ///
    /// See [`StudioConfig::resolve`].
    pub fn from_env(overrides: ConfigOverrides) -> ConfigResult<Self> {
        Self::resolve(|name| env::var(name).ok(), overrides)
    }

    /// Resolves settings using `lookup` for environment variables.
    ///
    /// Blank variables are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when neither credential
    /// variable is set, and a validation error for malformed values.
    pub fn resolve<F>(lookup: F, overrides: ConfigOverrides) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = var(GEMINI_API_KEY_ENV)
            .or_else(|| {
                let legacy = var(LEGACY_API_KEY_ENV);
                if legacy.is_some() {
                    debug!("using legacy {LEGACY_API_KEY_ENV} credential");
                }
                legacy
            })
            .ok_or(ConfigError::MissingCredential {
                primary: GEMINI_API_KEY_ENV,
                fallback: LEGACY_API_KEY_ENV,
            })?;

        let model = overrides
            .model
            .or_else(|| var(MODEL_ENV))
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let model = model.trim().to_owned();
        if model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let base_url = overrides
            .base_url
            .or_else(|| var(BASE_URL_ENV))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidBaseUrl { value: base_url });
        }
        if base_url.starts_with("http://") {
            warn!(%base_url, "API base URL is not using TLS");
        }

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => var(TIMEOUT_ENV)
                .map(|raw| {
                    raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                        name: TIMEOUT_ENV,
                        value: raw,
                    })
                })
                .transpose()?,
        };
        let timeout = match timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        if let Some(value) = overrides.temperature {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidTemperature { value });
            }
        }

        let output_dir = overrides
            .output_dir
            .or_else(|| var(OUTPUT_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
            output_dir,
            temperature: overrides.temperature,
        })
    }

    /// Model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Transport timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Export directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Sampling temperature override.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Builds the adapter configuration for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Adapter`] if the adapter rejects the base URL.
    pub fn gemini_config(&self) -> ConfigResult<GeminiConfig> {
        let mut config = GeminiConfig::new(&self.model)
            .with_api_key(&self.api_key)
            .with_timeout(self.timeout)
            .with_base_url(&self.base_url)
            .map_err(|err| ConfigError::Adapter {
                reason: err.to_string(),
            })?;
        if let Some(temperature) = self.temperature {
            config = config.with_default_temperature(temperature);
        }
        Ok(config)
    }
}

/// Loads variables from a `.env` file in the working directory or its
/// parents, without overriding variables that are already set.
///
/// Returns the loaded file, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenv::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env file");
            Some(path)
        }
        Err(err) => {
            debug!(error = %err, "no .env file loaded");
            None
        }
    }
}
