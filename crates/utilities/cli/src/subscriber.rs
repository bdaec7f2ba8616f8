//! Tracing subscriber setup.

use crate::CliResult;
use tracing::{Level, subscriber::set_global_default};
use tracing_subscriber::EnvFilter;

/// Maps a `-v` count to a log level.
///
/// `1` is `ERROR`, each additional `v` lowers the level, and `5` or more is `TRACE`.
pub const fn verbosity_level(verbosity: u8) -> Level {
    match verbosity {
        0 | 1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initializes the global tracing subscriber.
///
/// Directives from `env_filter`, or from `RUST_LOG` if it is `None`, refine the level selected by
/// `verbosity`.
pub fn init_tracing_subscriber(
    verbosity: u8,
    env_filter: Option<impl Into<EnvFilter>>,
) -> CliResult<()> {
    let filter = env_filter.map(Into::into).unwrap_or_else(EnvFilter::from_default_env);
    let filter = filter.add_directive(verbosity_level(verbosity).into());
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    set_global_default(subscriber)?;
    Ok(())
}
