//! Download gate middleware.
//! Maps gate verdicts onto HTTP responses.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::{ContentConfig, DownloadCheckConfig};
use crate::gate::signals::header_score;
use crate::gate::{challenge_page, evaluate, normalize_path, AccessDecision, DenyReason};
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Response header naming the failed check.
pub const X_DENY_REASON: &str = "x-deny-reason";

/// State required by the gate.
#[derive(Clone)]
pub struct GateState {
    pub check: Option<Arc<DownloadCheckConfig>>,
    pub content: Arc<ContentConfig>,
}

/// Gate protected paths before the content service sees them.
///
/// Prefix matching and evaluation run on the normalized path, so encoded
/// or dotted spellings of a file are judged the same as the plain one.
pub async fn download_gate_middleware(
    State(state): State<GateState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(path) = normalize_path(request.uri().path()) else {
        tracing::warn!(
            request_id = %request.request_id(),
            raw_path = %request.uri().path(),
            "Rejected undecodable request path"
        );
        return (StatusCode::BAD_REQUEST, "Bad Request: undecodable path").into_response();
    };
    if !state.content.is_protected(&path) {
        return next.run(request).await;
    }

    let decision = evaluate(&path, request.headers(), state.check.as_deref());
    let request_id = request.request_id().to_string();
    metrics::record_decision(
        decision.label(),
        decision.reason().map(|r| r.as_str()).unwrap_or("none"),
    );

    let mut response = match decision {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Deny(reason) => {
            match denial_score(reason, request.headers()) {
                Some(score) => tracing::warn!(
                    request_id = %request_id,
                    path = %path,
                    reason = %reason,
                    score,
                    "Download denied"
                ),
                None => tracing::warn!(request_id = %request_id, path = %path, reason = %reason, "Download denied"),
            }
            deny_response(reason)
        }
        AccessDecision::Challenge => {
            tracing::debug!(request_id = %request_id, path = %path, "Script challenge issued");
            challenge_response()
        }
    };

    response.extensions_mut().insert(decision);
    response
}

/// Header score worth logging alongside a deny.
fn denial_score(reason: DenyReason, headers: &HeaderMap) -> Option<u32> {
    (reason == DenyReason::HeaderScoreTooLow).then(|| header_score(headers))
}

/// `403` carrying the failed check.
pub fn deny_response(reason: DenyReason) -> Response {
    (
        StatusCode::FORBIDDEN,
        [(X_DENY_REASON, reason.as_str())],
        format!("Forbidden: {reason}"),
    )
        .into_response()
}

/// `200` interstitial that sets the proof cookie and reloads.
pub fn challenge_response() -> Response {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-store")],
        Html(challenge_page()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(check: Option<DownloadCheckConfig>, prefixes: &[&str]) -> Router {
        let state = GateState {
            check: check.map(Arc::new),
            content: Arc::new(ContentConfig {
                root: ".".into(),
                protected_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            }),
        };
        Router::new()
            .route("/{*path}", get(|| async { "file-bytes" }))
            .layer(middleware::from_fn_with_state(state, download_gate_middleware))
    }

    fn get_request(path: &str, user_agent: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header(header::USER_AGENT, user_agent)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_deny_maps_to_forbidden_with_reason() {
        let check = DownloadCheckConfig {
            enable_user_agent: true,
            ..DownloadCheckConfig::default()
        };
        let response = app(Some(check), &["/"])
            .oneshot(get_request("/files/a.zip", "curl/8.0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[X_DENY_REASON], "user_agent_blocked");
        assert_eq!(
            response.extensions().get::<AccessDecision>(),
            Some(&AccessDecision::Deny(DenyReason::UserAgentBlocked))
        );
    }

    #[tokio::test]
    async fn test_challenge_page_served() {
        let check = DownloadCheckConfig {
            enable_js_check: true,
            ..DownloadCheckConfig::default()
        };
        let response = app(Some(check), &["/"])
            .oneshot(get_request("/files/a.zip", "anything"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("dl_js_verified=1"));
    }

    #[tokio::test]
    async fn test_encoded_spellings_are_gated() {
        let check = DownloadCheckConfig {
            enable_user_agent: true,
            ..DownloadCheckConfig::default()
        };
        for path in ["/files/report%2Epdf", "/%66iles/report.pdf", "/./files//report.pdf"] {
            let response = app(Some(check.clone()), &["/files/"])
                .oneshot(get_request(path, "curl/8.4.0"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
            assert_eq!(response.headers()[X_DENY_REASON], "user_agent_blocked", "{path}");
        }
    }

    #[tokio::test]
    async fn test_undecodable_path_is_rejected() {
        let response = app(None, &["/"])
            .oneshot(get_request("/files/%FF.pdf", "curl/8.4.0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_score_logged_only_for_score_denials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, "text/html".parse().unwrap());
        headers.insert(header::CACHE_CONTROL, "no-cache".parse().unwrap());
        assert_eq!(denial_score(DenyReason::HeaderScoreTooLow, &headers), Some(2));
        assert_eq!(denial_score(DenyReason::UserAgentBlocked, &headers), None);
    }

    #[tokio::test]
    async fn test_unprotected_paths_skip_the_gate() {
        let response = app(Some(DownloadCheckConfig::all_enabled()), &["/protected/"])
            .oneshot(get_request("/public/a.zip", "curl/8.0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.extensions().get::<AccessDecision>().is_none());
    }
}
