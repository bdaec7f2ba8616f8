//! Logging arguments.

use crate::{CliResult, init_tracing_subscriber};
use clap::{ArgAction, Args};
use tracing_subscriber::EnvFilter;

/// Logging arguments shared by the binaries.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Verbosity level (1-5). Without the flag the level is INFO.
    ///
    /// - `-v`: errors
    /// - `-vv`: warnings
    /// - `-vvv`: info
    /// - `-vvvv`: debug
    /// - `-vvvvv`: trace
    #[arg(short = 'v', global = true, action = ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,
    /// Additional filter directives, in `RUST_LOG` syntax.
    #[arg(long = "log.filter", env = "RUST_LOG")]
    pub filter: Option<String>,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self { verbosity: 3, filter: None }
    }
}

impl LogArgs {
    /// Installs the global tracing subscriber for these arguments.
    pub fn init_tracing(&self) -> CliResult<()> {
        let filter = self.filter.as_deref().map(EnvFilter::try_new).transpose()?;
        init_tracing_subscriber(self.verbosity, filter)
    }
}
