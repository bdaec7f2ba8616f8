//! Prometheus metrics arguments.

use crate::{PrometheusError, init_prometheus_server};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr};

/// Arguments controlling the Prometheus metrics server.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MetricsArgs {
    /// Serve Prometheus metrics.
    #[arg(long = "metrics.enabled", env = "KONA_METRICS_ENABLED", default_value_t = false)]
    pub enabled: bool,
    /// Address the metrics server listens on.
    #[arg(long = "metrics.addr", env = "KONA_METRICS_ADDR", default_value = "0.0.0.0")]
    pub addr: IpAddr,
    /// Port the metrics server listens on.
    #[arg(long = "metrics.port", env = "KONA_METRICS_PORT", default_value_t = 9090)]
    pub port: u16,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 9090 }
    }
}

impl MetricsArgs {
    /// Starts the metrics server if it is enabled.
    pub fn init_metrics(&self) -> Result<(), PrometheusError> {
        if self.enabled {
            init_prometheus_server(self.addr, self.port)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        metrics: MetricsArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.metrics, MetricsArgs::default());
    }

    #[test]
    fn test_custom_listener() {
        let cli = TestCli::try_parse_from([
            "test",
            "--metrics.enabled",
            "--metrics.addr",
            "127.0.0.1",
            "--metrics.port",
            "7300",
        ])
        .unwrap();
        assert!(cli.metrics.enabled);
        assert_eq!(cli.metrics.addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(cli.metrics.port, 7300);
    }
}
