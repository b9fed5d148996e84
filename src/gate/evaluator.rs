//! Ordered download-gate pipeline.

use axum::http::HeaderMap;

use crate::config::DownloadCheckConfig;
use crate::gate::decision::{AccessDecision, DenyReason};
use crate::gate::download::{is_download_attempt, is_landing_page};
use crate::gate::signals::ClassifierSignals;
use crate::gate::user_agent::{classify, UserAgentClass, VersionFloor};

/// Decide whether to serve, deny or challenge a request.
///
/// Steps run in a fixed order and disabled steps always pass:
/// 1. referrer allowlist bypass
/// 2. user-agent classification
/// 3. header-feature scoring
/// 4. referrer presence
/// 5. script challenge
///
/// Requests that are not download attempts are allowed before any step
/// runs. A missing config disables every step.
pub fn evaluate(
    path: &str,
    headers: &HeaderMap,
    config: Option<&DownloadCheckConfig>,
) -> AccessDecision {
    let Some(config) = config else {
        return AccessDecision::Allow;
    };

    if !is_download_attempt(path, headers) {
        return AccessDecision::Allow;
    }

    let signals = ClassifierSignals::from_request(path, headers);
    evaluate_signals(&signals, config)
}

/// Pipeline over precomputed signals, for a request already known to be a
/// download attempt.
pub fn evaluate_signals(signals: &ClassifierSignals, config: &DownloadCheckConfig) -> AccessDecision {
    if config.enable_referrer && signals.referrer_allowlisted(&config.allowed_ref_domains) {
        return AccessDecision::Allow;
    }

    if config.enable_user_agent {
        let floor = VersionFloor {
            browser: config.min_browser_version,
            safari: config.min_safari_version,
        };
        match classify(signals.user_agent.as_deref(), floor) {
            UserAgentClass::Browser => {}
            UserAgentClass::Missing => return AccessDecision::Deny(DenyReason::UserAgentMissing),
            UserAgentClass::Blocked(_) => return AccessDecision::Deny(DenyReason::UserAgentBlocked),
            UserAgentClass::Unrecognized => {
                return AccessDecision::Deny(DenyReason::UserAgentUnrecognized)
            }
        }
    }

    if config.enable_browser_feature && signals.header_score < config.min_header_score {
        return AccessDecision::Deny(DenyReason::HeaderScoreTooLow);
    }

    if config.enable_referrer && signals.referrer.is_none() && !is_landing_page(&signals.path) {
        return AccessDecision::Deny(DenyReason::ReferrerMissing);
    }

    if config.enable_js_check && !signals.has_js_cookie {
        return AccessDecision::Challenge;
    }

    AccessDecision::Allow
}
