//! Shared CLI utilities: logging, metrics and help styling.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::{CliError, CliResult, PrometheusError};

pub mod log;
pub use log::LogArgs;

pub mod metrics_args;
pub use metrics_args::MetricsArgs;

mod prometheus;
pub use prometheus::init_prometheus_server;

mod styles;
pub use styles::cli_styles;

mod subscriber;
pub use subscriber::{init_tracing_subscriber, verbosity_level};
