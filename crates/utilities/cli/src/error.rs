//! Error types for CLI utilities.

use metrics_exporter_prometheus::BuildError;
use std::io;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;

/// Error type for prometheus server initialization.
#[derive(Debug, Error)]
pub enum PrometheusError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] io::Error),
    /// Failed to build or install the prometheus recorder.
    #[error("failed to install prometheus recorder: {0}")]
    Build(#[from] BuildError),
}

/// Errors that can occur in CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(#[from] ParseError),

    /// A global tracing subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    TracingInitialization(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Error initializing metrics.
    #[error("Failed to initialize metrics: {0}")]
    MetricsInitialization(#[from] PrometheusError),
}

/// Type alias for CLI results.
pub type CliResult<T> = Result<T, CliError>;
