//! Static content behind the gate.
//!
//! Serving itself is delegated to `tower-http`'s `ServeDir`; this module
//! only adds attachment disposition for downloadable files.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::services::ServeDir;

use crate::gate::download::{has_download_extension, normalize_path};

/// File service rooted at `root`.
pub fn content_service(root: &str) -> ServeDir {
    ServeDir::new(root)
}

/// `attachment` disposition value for the last path segment.
pub fn attachment_header(path: &str) -> Option<HeaderValue> {
    let name: String = path
        .rsplit('/')
        .next()?
        .chars()
        .filter(|c| *c != '"' && *c != '\\')
        .collect();
    if name.is_empty() {
        return None;
    }
    HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")).ok()
}

/// Mark successful download responses as attachments.
pub async fn attachment_disposition(request: Request<Body>, next: Next) -> Response {
    let path = normalize_path(request.uri().path()).filter(|p| has_download_extension(p));
    let mut response = next.run(request).await;

    if let Some(path) = path {
        if response.status().is_success()
            && !response.headers().contains_key(header::CONTENT_DISPOSITION)
        {
            if let Some(value) = attachment_header(&path) {
                response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
            }
        }
    }
    response
}
