//! Tracing subscriber setup.
//!
//! Logs go to stderr so that interactive output on stdout stays clean.

#![warn(missing_docs, clippy::pedantic)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when neither an explicit level nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised: {reason}")]
    AlreadyInitialized {
        /// Underlying error message.
        reason: String,
    },
}

/// Subscriber options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    directive: Option<String>,
    with_target: bool,
    ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            directive: None,
            with_target: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Uses `directive` instead of `RUST_LOG`.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Includes the event target (module path) in each line.
    #[must_use]
    pub const fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Enables or disables ANSI colouring.
    #[must_use]
    pub const fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    /// Builds the filter: the explicit directive, else `RUST_LOG`, else
    /// [`DEFAULT_DIRECTIVE`].
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidFilter`] for an unparsable explicit
    /// directive. An unparsable `RUST_LOG` falls back to the default.
    pub fn filter(&self) -> TelemetryResult<EnvFilter> {
        match &self.directive {
            Some(directive) => {
                EnvFilter::try_new(directive).map_err(|err| TelemetryError::InvalidFilter {
                    directive: directive.clone(),
                    reason: err.to_string(),
                })
            }
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
        }
    }
}

/// Installs the global `fmt` subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init(config: &TelemetryConfig) -> TelemetryResult<()> {
    let filter = config.filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInitialized {
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directive_is_parsed() {
        let config = TelemetryConfig::default().with_directive("scene_kernel=debug,warn");
        assert!(config.filter().is_ok());
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let config = TelemetryConfig::default().with_directive("scene_kernel=loud");
        let err = config.filter().unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }

    #[test]
    fn second_init_fails() {
        let config = TelemetryConfig::default().with_directive("off").with_ansi(false);
        let first = init(&config);
        let second = init(&config);
        assert!(first.is_ok() || second.is_err());
        assert!(matches!(
            second,
            Err(TelemetryError::AlreadyInitialized { .. })
        ));
    }
}
