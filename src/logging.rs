//! Tracing subscriber setup for binaries and tests that use this crate.
//!
//! The library crates only emit events (`trace!` for shuffles, `debug!` for
//! tolerance failures and name interning, `error!` for unsupported backend
//! operations); installing a subscriber is left to the application.

use std::env;

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Environment variable read by [`TracingConfig::from_env`] for directives.
pub const DIRECTIVES_ENV: &str = "STENCIL_LOG";

/// How the subscriber installed by [`init_tracing`] behaves.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Filter directives, e.g. `stencil_vec=trace,info`. When absent,
    /// `RUST_LOG` is used, and then [`default_directive`](Self::default_directive).
    pub directives: Option<String>,
    pub default_directive: String,
    /// Emit ANSI colour codes.
    pub ansi: bool,
    /// Show event targets (module paths).
    pub include_targets: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            ansi: true,
            include_targets: true,
        }
    }
}

impl TracingConfig {
    /// Plain output for CI logs.
    pub fn for_ci() -> Self {
        Self {
            ansi: false,
            ..Self::default()
        }
    }

    /// Defaults overridden by [`DIRECTIVES_ENV`] and `NO_COLOR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(directives) = env::var(DIRECTIVES_ENV) {
            if !directives.trim().is_empty() {
                config.directives = Some(directives);
            }
        }
        if env::var_os("NO_COLOR").is_some() {
            config.ansi = false;
        }
        config
    }

    fn resolve_filter(&self) -> Result<EnvFilter, TracingInitError> {
        match &self.directives {
            Some(directives) => EnvFilter::try_new(directives)
                .map_err(|err| TracingInitError::InvalidFilter(err.to_string())),
            None => match EnvFilter::try_from_default_env() {
                Ok(filter) => Ok(filter),
                Err(_) => EnvFilter::try_new(&self.default_directive)
                    .map_err(|err| TracingInitError::InvalidFilter(err.to_string())),
            },
        }
    }
}

/// Errors from [`init_tracing`].
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    #[error("invalid tracing directive: {0}")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the subscriber described by `config` without installing it.
pub fn build_subscriber(
    config: &TracingConfig,
) -> Result<impl Subscriber + Send + Sync, TracingInitError> {
    let filter = config.resolve_filter()?;
    let layer = tracing_fmt::layer()
        .with_target(config.include_targets)
        .with_ansi(config.ansi);
    Ok(Registry::default().with(layer).with(filter))
}

/// Install the subscriber described by `config` as the process-wide default.
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingInitError> {
    build_subscriber(config)?.try_init()?;
    Ok(())
}
