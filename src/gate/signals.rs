//! Per-request classifier signals and header-feature scoring.

use axum::http::{header, HeaderMap};
use axum::http::header::{AsHeaderName, HeaderName};

use crate::gate::challenge::has_proof_cookie;

/// Header value as `&str`, `None` if absent or not visible ASCII.
pub fn header_str<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_contains(headers: &HeaderMap, name: HeaderName, needles: &[&str]) -> bool {
    header_str(headers, name)
        .map(|v| {
            let v = v.to_ascii_lowercase();
            needles.iter().any(|n| v.contains(n))
        })
        .unwrap_or(false)
}

fn header_equals(headers: &HeaderMap, name: HeaderName, expected: &str) -> bool {
    header_str(headers, name)
        .map(|v| v.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

const COMPRESSION_SCHEMES: &[&str] = &["gzip", "deflate", "br", "zstd"];

fn multiple_encodings(headers: &HeaderMap) -> bool {
    header_str(headers, header::ACCEPT_ENCODING)
        .map(|v| {
            let v = v.to_ascii_lowercase();
            let offered: Vec<&str> = v
                .split(',')
                .map(|token| token.split(';').next().unwrap_or("").trim())
                .collect();
            COMPRESSION_SCHEMES
                .iter()
                .filter(|scheme| offered.contains(scheme))
                .count()
                >= 2
        })
        .unwrap_or(false)
}

type Signal = fn(&HeaderMap) -> bool;

/// One point per satisfied signal.
pub const HEADER_SIGNALS: &[(&str, Signal)] = &[
    ("accept_html", |h: &HeaderMap| header_contains(h, header::ACCEPT, &["text/html"])),
    ("accept_modern_image", |h: &HeaderMap| {
        header_contains(h, header::ACCEPT, &["image/webp", "image/avif", "image/apng"])
    }),
    ("accept_language", |h: &HeaderMap| h.contains_key(header::ACCEPT_LANGUAGE)),
    ("accept_encoding_multi", multiple_encodings),
    ("sec_fetch_site", |h: &HeaderMap| h.contains_key("sec-fetch-site")),
    ("sec_fetch_mode", |h: &HeaderMap| h.contains_key("sec-fetch-mode")),
    ("sec_fetch_dest", |h: &HeaderMap| h.contains_key("sec-fetch-dest")),
    ("sec_ch_ua", |h: &HeaderMap| h.contains_key("sec-ch-ua")),
    ("connection_keep_alive", |h: &HeaderMap| header_equals(h, header::CONNECTION, "keep-alive")),
    ("upgrade_insecure_requests", |h: &HeaderMap| {
        header_equals(h, header::UPGRADE_INSECURE_REQUESTS, "1")
    }),
    ("cache_control", |h: &HeaderMap| h.contains_key(header::CACHE_CONTROL)),
];

/// Count of satisfied header signals.
pub fn header_score(headers: &HeaderMap) -> u32 {
    HEADER_SIGNALS
        .iter()
        .filter(|(_, signal)| signal(headers))
        .count() as u32
}

/// Read-only view of the request data the gate decides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSignals {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub header_score: u32,
    pub has_js_cookie: bool,
    pub path: String,
}

impl ClassifierSignals {
    pub fn from_request(path: &str, headers: &HeaderMap) -> Self {
        Self {
            user_agent: header_str(headers, header::USER_AGENT).map(str::to_string),
            referrer: header_str(headers, header::REFERER)
                .filter(|r| !r.trim().is_empty())
                .map(str::to_string),
            header_score: header_score(headers),
            has_js_cookie: has_proof_cookie(headers),
            path: path.to_string(),
        }
    }

    /// True if the referrer contains any allowed domain substring.
    pub fn referrer_allowlisted(&self, allowed_domains: &[String]) -> bool {
        match &self.referrer {
            Some(referrer) => allowed_domains
                .iter()
                .filter(|d| !d.is_empty())
                .any(|d| referrer.contains(d.as_str())),
            None => false,
        }
    }
}
