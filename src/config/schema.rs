//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the download gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, client address trust).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static content served behind the gate.
    pub content: ContentConfig,

    /// Download check toggles. `None` disables every check.
    pub download_check: Option<DownloadCheckConfig>,

    /// Geolocation enrichment for audit logs.
    pub geo: GeoConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Take the client address from the first `X-Forwarded-For` entry.
    pub trust_forwarded_for: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trust_forwarded_for: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Content root and the paths the gate protects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory served as static content.
    pub root: String,

    /// Path prefixes on which the download gate runs.
    pub protected_prefixes: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: "./public".to_string(),
            protected_prefixes: vec!["/".to_string()],
        }
    }
}

impl ContentConfig {
    /// Returns true if the gate must run for this path.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Toggles and thresholds for the download gate.
///
/// Every check defaults to disabled, so a present-but-empty table behaves
/// like an absent one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadCheckConfig {
    /// Referrer allowlist bypass and referrer presence check.
    pub enable_referrer: bool,

    /// User-agent deny/allow classification.
    pub enable_user_agent: bool,

    /// Header-feature scoring.
    pub enable_browser_feature: bool,

    /// JavaScript-capability challenge.
    pub enable_js_check: bool,

    /// Referrer substrings that bypass all further checks.
    pub allowed_ref_domains: Vec<String>,

    /// Minimum major version for an allowlisted browser engine.
    pub min_browser_version: u32,

    /// Minimum Safari release, read from its `Version/` token.
    pub min_safari_version: u32,

    /// Minimum header-feature score.
    pub min_header_score: u32,
}

impl Default for DownloadCheckConfig {
    fn default() -> Self {
        Self {
            enable_referrer: false,
            enable_user_agent: false,
            enable_browser_feature: false,
            enable_js_check: false,
            allowed_ref_domains: Vec::new(),
            min_browser_version: 70,
            min_safari_version: 12,
            min_header_score: 5,
        }
    }
}

impl DownloadCheckConfig {
    /// All checks switched on, with default thresholds.
    pub fn all_enabled() -> Self {
        Self {
            enable_referrer: true,
            enable_user_agent: true,
            enable_browser_feature: true,
            enable_js_check: true,
            ..Self::default()
        }
    }
}

/// Geolocation lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Enable geo enrichment of audit lines.
    pub enabled: bool,

    /// Provider URL template; `{address}` is replaced by the client address.
    pub endpoint: String,

    /// Maximum number of cached addresses.
    pub max_entries: usize,

    /// Provider call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://ip-api.com/json/{address}".to_string(),
            max_entries: 100,
            timeout_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
