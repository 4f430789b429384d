// src/logging.rs

//! Tracing setup for the storefront binaries
//!
//! Native builds log to the console and, when configured, to a daily-rolling
//! file written off-thread. `RUST_LOG` overrides the configured level. Web
//! builds forward events to the browser console.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(Error::validation(
                "logging.level",
                format!("Unknown log level '{}'", other),
            )),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Keeps the background log writers alive; flushes on drop
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    #[cfg(not(target_arch = "wasm32"))]
    _guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
}

/// Filter directive for `config`: the configured level for this crate,
/// `warn` for everything else.
pub fn filter_directive(config: &LoggingConfig) -> String {
    let level = config
        .level
        .parse::<LogLevel>()
        .unwrap_or(LogLevel::Info);
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
}

#[cfg(not(target_arch = "wasm32"))]
fn init_error(e: impl fmt::Display) -> Error {
    Error::new(
        crate::error::ErrorKind::Configuration {
            key: Some("logging".to_string()),
            validation_errors: Vec::new(),
        },
        format!("Failed to initialize logging: {}", e),
    )
    .source("logging")
}

/// Installs the global subscriber
#[cfg(not(target_arch = "wasm32"))]
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    use crate::config::LogFormat;
    use tracing_subscriber::layer::{Identity, SubscriberExt};
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

    let mut guards = Vec::new();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let registry = Registry::default().with(filter);

    // Console output goes to stderr so command output stays clean
    let registry = if config.console.enabled {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.console.colored)
            .with_target(true)
            .boxed();
        registry.with(console_layer)
    } else {
        registry.with(Identity::new().boxed())
    };

    let registry = if let Some(file_config) = &config.file {
        std::fs::create_dir_all(&file_config.directory)?;
        let file_appender =
            tracing_appender::rolling::daily(&file_config.directory, &file_config.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        let file_layer = match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed(),
        };
        registry.with(file_layer)
    } else {
        registry.with(Identity::new().boxed())
    };

    registry.try_init().map_err(init_error)?;

    tracing::debug!(
        level = %config.level,
        file = config.file.is_some(),
        "logging initialized"
    );
    Ok(LoggingGuard { _guards: guards })
}

/// Installs the browser console subscriber and panic hook
#[cfg(target_arch = "wasm32")]
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    console_error_panic_hook::set_once();

    let level = config
        .level
        .parse::<LogLevel>()
        .unwrap_or(LogLevel::Info);
    let wasm_config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(level.into())
        .build();
    tracing_wasm::set_as_global_default_with_config(wasm_config);

    Ok(LoggingGuard::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileLogConfig, LogFormat};

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
        assert!(LogLevel::Error > LogLevel::Info);
    }

    #[test]
    fn test_filter_directive() {
        let mut config = LoggingConfig::default();
        config.level = "debug".to_string();
        assert_eq!(filter_directive(&config), "warn,storefront=debug");

        config.level = "nonsense".to_string();
        assert_eq!(filter_directive(&config), "warn,storefront=info");
    }

    #[test]
    fn test_init_with_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
            console: Default::default(),
            file: Some(FileLogConfig {
                directory: dir.path().join("logs"),
                file_prefix: "test.log".to_string(),
            }),
        };

        // Another test may already own the global subscriber
        let result = init(&config);
        assert!(dir.path().join("logs").is_dir());
        if let Err(error) = result {
            assert!(error.message.contains("Failed to initialize logging"));
        }
    }
}
