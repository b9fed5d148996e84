//! Gate verdicts.

use std::fmt;

/// Outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the resource.
    Allow,
    /// Reject with the reason of the failing step.
    Deny(DenyReason),
    /// Serve the script challenge; the client is expected to retry.
    Challenge,
}

impl AccessDecision {
    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AccessDecision::Allow => "allow",
            AccessDecision::Deny(_) => "deny",
            AccessDecision::Challenge => "challenge",
        }
    }

    /// Deny reason, if any.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            AccessDecision::Deny(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why a download attempt was rejected. One variant per failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No `User-Agent` header.
    UserAgentMissing,
    /// User agent matched an automation signature.
    UserAgentBlocked,
    /// User agent is not a recent, recognized browser.
    UserAgentUnrecognized,
    /// Too few modern-browser headers.
    HeaderScoreTooLow,
    /// No referrer on a direct hit outside the landing page.
    ReferrerMissing,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::UserAgentMissing => "user_agent_missing",
            DenyReason::UserAgentBlocked => "user_agent_blocked",
            DenyReason::UserAgentUnrecognized => "user_agent_unrecognized",
            DenyReason::HeaderScoreTooLow => "header_score_too_low",
            DenyReason::ReferrerMissing => "referrer_missing",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
