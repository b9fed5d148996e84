//! JavaScript-capability challenge.
//!
//! The challenge page sets a proof cookie from script and reloads. Clients
//! that cannot run script never carry the cookie. No server-side state is
//! kept: the decision depends only on whether the cookie is present.

use axum::http::{header, HeaderMap};

/// Name of the cookie set by the challenge script.
pub const PROOF_COOKIE: &str = "dl_js_verified";

/// True if any `Cookie` header carries a non-empty proof cookie.
pub fn has_proof_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name.trim() == PROOF_COOKIE && !value.trim().is_empty())
}

/// Minimal interstitial that proves script execution and retries the request.
pub fn challenge_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Preparing download</title></head>
<body>
<p>Preparing your download&hellip;</p>
<script>
  document.cookie = "{PROOF_COOKIE}=1; path=/; SameSite=Lax";
  window.location.reload();
</script>
<noscript>Please enable JavaScript to download this file.</noscript>
</body>
</html>
"#
    )
}
