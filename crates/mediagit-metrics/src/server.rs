// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! HTTP server for Prometheus metrics endpoint
//!
//! Provides an Axum-based HTTP server that exposes a `/metrics` endpoint
//! in Prometheus text exposition format.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::{types::MetricsConfig, MetricsRegistry};

/// HTTP server for Prometheus metrics
///
/// Provides a lightweight HTTP server with a single `/metrics` endpoint
/// that returns metrics in Prometheus text format.
#[derive(Clone)]
pub struct MetricsServer {
    registry: Arc<MetricsRegistry>,
    config: MetricsConfig,
}

impl MetricsServer {
    /// Create a new metrics server
    ///
    /// # Arguments
    /// * `registry` - The metrics registry to serve
    /// * `port` - Port to bind the server to
    ///
    /// # Returns
    /// A new MetricsServer instance
    pub fn new(registry: MetricsRegistry, port: u16) -> Self {
        Self {
            registry: Arc::new(registry),
            config: MetricsConfig::with_port(port),
        }
    }

    /// Create a new metrics server with custom configuration
    pub fn with_config(registry: MetricsRegistry, config: MetricsConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// Get the bind address for the server
    pub fn bind_address(&self) -> String {
        self.config.socket_addr()
    }

    /// Start the metrics server
    ///
    /// This method runs the server indefinitely. It should typically be spawned
    /// as a background task.
    ///
    /// # Example
    /// ```ignore
    /// let server = MetricsServer::new(registry, 9090);
    /// tokio::spawn(async move {
    ///     server.serve().await
    /// });
    /// ```
    pub async fn serve(self) -> anyhow::Result<()> {
        if !self.config.enabled {
            info!("Metrics server disabled");
            return Ok(());
        }

        let addr = self.config.socket_addr();
        info!("Starting metrics server on http://{}/metrics", addr);

        // Build the router
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(Arc::clone(&self.registry));

        // Bind and serve
        let listener = TcpListener::bind(&addr).await?;
        info!("Metrics server listening on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Metrics server error: {}", e))
    }
}

/// Handler for `/metrics` endpoint
///
/// Returns all metrics in Prometheus text exposition format
async fn metrics_handler(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    debug!("Serving metrics");

    // Gather metrics
    let metric_families = registry.registry().gather();

    // Encode in Prometheus text format
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => {
            debug!("Successfully encoded {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [("content-type", encoder.format_type())],
                buffer,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Handler for `/health` endpoint
///
/// Returns a simple health check response
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
