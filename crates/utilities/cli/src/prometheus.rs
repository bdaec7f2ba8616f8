//! Utilities for spinning up a prometheus metrics server.

use crate::PrometheusError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr, TcpListener};
use tracing::info;

/// Start a Prometheus metrics server on the given address and port.
///
/// A port of `0` binds an OS-assigned port. Returns the address the server listens on.
pub fn init_prometheus_server(addr: IpAddr, metrics_port: u16) -> Result<SocketAddr, PrometheusError> {
    let listen_addr = if metrics_port == 0 {
        // The builder binds its own listener, so resolve the port up front.
        let listener = TcpListener::bind((addr, 0))?;
        listener.local_addr()?
    } else {
        SocketAddr::from((addr, metrics_port))
    };

    PrometheusBuilder::new().with_http_listener(listen_addr).install()?;

    info!(target: "prometheus", "Serving metrics at: http://{}", listen_addr);

    Ok(listen_addr)
}
