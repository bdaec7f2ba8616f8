//! CLI flags.

mod relayer;
pub use relayer::RelayerArgs;
