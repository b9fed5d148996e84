//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router serving static content as fallback
//! - Wire up middleware (request ID, tracing, timeout, audit, gate)
//! - Build the geolocation cache used for audit enrichment
//! - Bind server to listener with graceful shutdown

use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::geo::{GeoCache, HttpGeoProvider, LookupError};
use crate::http::content::{attachment_disposition, content_service};
use crate::http::middleware::{audit_middleware, download_gate_middleware, AuditState, GateState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build geolocation client: {0}")]
    GeoProvider(#[from] LookupError),
}

/// HTTP server for the download gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    geo: Option<Arc<GeoCache<HttpGeoProvider>>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, ServerError> {
        let geo = if config.geo.enabled {
            let timeout = Duration::from_millis(config.geo.timeout_ms);
            let provider = HttpGeoProvider::new(config.geo.endpoint.clone(), timeout)?;
            Some(Arc::new(GeoCache::new(provider, config.geo.max_entries, timeout)))
        } else {
            None
        };

        let router = Self::build_router(&config, geo.clone());
        Ok(Self {
            router,
            config,
            geo,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, geo: Option<Arc<GeoCache<HttpGeoProvider>>>) -> Router {
        let gate_state = GateState {
            check: config.download_check.clone().map(Arc::new),
            content: Arc::new(config.content.clone()),
        };
        let audit_state = AuditState {
            geo,
            trust_forwarded_for: config.listener.trust_forwarded_for,
        };

        Router::new()
            .fallback_service(content_service(&config.content.root))
            .layer(middleware::from_fn(attachment_disposition))
            .layer(middleware::from_fn_with_state(gate_state, download_gate_middleware))
            .layer(middleware::from_fn_with_state(audit_state, audit_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gate_enabled = self.config.download_check.is_some(),
            geo_enabled = self.geo.is_some(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Shared geolocation cache, if enrichment is enabled.
    pub fn geo_cache(&self) -> Option<Arc<GeoCache<HttpGeoProvider>>> {
        self.geo.clone()
    }
}
