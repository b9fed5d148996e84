//! Per-request audit logging with geolocation enrichment.
//!
//! The audit line is written after the response is produced. When geo
//! enrichment is on, the lookup and the log line run on a spawned task so a
//! slow provider never delays the response.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use crate::gate::AccessDecision;
use crate::geo::{GeoCache, GeoEntry, HttpGeoProvider};
use crate::http::request::RequestIdExt;
use crate::observability::logging::AUDIT_TARGET;

/// State required for audit logging.
#[derive(Clone)]
pub struct AuditState {
    pub geo: Option<Arc<GeoCache<HttpGeoProvider>>>,
    pub trust_forwarded_for: bool,
}

/// Client address from the first `X-Forwarded-For` entry when trusted,
/// otherwise from the socket peer.
pub fn client_address(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    peer.map(|addr| addr.ip())
}

struct AuditRecord {
    request_id: String,
    client: Option<IpAddr>,
    method: String,
    path: String,
    status: u16,
    decision: Option<AccessDecision>,
    elapsed_ms: u128,
}

impl AuditRecord {
    fn emit(&self, geo: Option<&GeoEntry>) {
        let client = self
            .client
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());
        let geo = geo
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        let decision = self.decision.map(|d| d.label()).unwrap_or("ungated");
        let reason = self
            .decision
            .and_then(|d| d.reason())
            .map(|r| r.as_str())
            .unwrap_or("-");

        tracing::info!(
            target: AUDIT_TARGET,
            request_id = %self.request_id,
            client = %client,
            geo = %geo,
            method = %self.method,
            path = %self.path,
            status = self.status,
            decision = decision,
            reason = reason,
            elapsed_ms = self.elapsed_ms as u64,
            "request"
        );
    }
}

pub async fn audit_middleware(
    State(state): State<AuditState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_address(request.headers(), peer, state.trust_forwarded_for);
    let request_id = request.request_id().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let record = AuditRecord {
        request_id,
        client,
        method,
        path,
        status: response.status().as_u16(),
        decision: response.extensions().get::<AccessDecision>().copied(),
        elapsed_ms: start.elapsed().as_millis(),
    };

    match (state.geo, client) {
        (Some(geo), Some(ip)) => {
            tokio::spawn(async move {
                let entry = geo.lookup(&ip.to_string()).await;
                record.emit(Some(&entry));
            });
        }
        _ => record.emit(None),
    }

    response
}
