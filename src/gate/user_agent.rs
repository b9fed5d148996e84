//! User-agent classification.
//!
//! Two fixed tables: automation signatures that always reject, and browser
//! engine tokens carrying a major version. The first engine token found in
//! the user agent decides the version check, so Chromium-based browsers are
//! judged by their own token rather than the trailing `Safari/` build.
//! Safari's `Safari/` token is a WebKit build number; its release lives in
//! `Version/` and has its own floor.

/// Automation and tooling signatures, matched as lowercase substrings.
pub const DENY_PATTERNS: &[(&str, &str)] = &[
    ("curl", "command-line client"),
    ("wget", "command-line client"),
    ("httpie", "command-line client"),
    ("aria2", "download manager"),
    ("axel", "download manager"),
    ("internet download manager", "download manager"),
    ("free download manager", "download manager"),
    ("jdownloader", "download manager"),
    ("python", "scripting library"),
    ("requests", "scripting library"),
    ("urllib", "scripting library"),
    ("aiohttp", "scripting library"),
    ("httpx", "scripting library"),
    ("java", "scripting library"),
    ("okhttp", "scripting library"),
    ("go-http-client", "scripting library"),
    ("node-fetch", "scripting library"),
    ("axios", "scripting library"),
    ("undici", "scripting library"),
    ("libwww-perl", "scripting library"),
    ("lwp", "scripting library"),
    ("php", "scripting library"),
    ("ruby", "scripting library"),
    ("scrapy", "crawler framework"),
    ("postman", "api client"),
    ("insomnia", "api client"),
    ("headless", "automated browser"),
    ("phantomjs", "automated browser"),
    ("selenium", "automated browser"),
    ("puppeteer", "automated browser"),
    ("playwright", "automated browser"),
    // Also catches a few device names such as CUBOT.
    ("bot", "generic bot"),
    ("crawler", "generic crawler"),
    ("spider", "generic crawler"),
    ("slurp", "generic crawler"),
];

/// How an engine reports its release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Versioning {
    /// Major version follows the engine token itself.
    Token,
    /// Major version follows `Version/`, judged against the Safari floor.
    Safari,
}

/// A recognized browser engine token.
#[derive(Debug, Clone, Copy)]
pub struct BrowserEngine {
    pub name: &'static str,
    pub token: &'static str,
    pub versioning: Versioning,
}

const fn engine(name: &'static str, token: &'static str) -> BrowserEngine {
    BrowserEngine {
        name,
        token,
        versioning: Versioning::Token,
    }
}

/// Browser engine tokens in precedence order.
pub const BROWSER_ENGINES: &[BrowserEngine] = &[
    engine("Edge", "Edg/"),
    engine("Opera", "OPR/"),
    engine("Firefox", "Firefox/"),
    engine("Firefox iOS", "FxiOS/"),
    engine("Chrome iOS", "CriOS/"),
    engine("Chrome", "Chrome/"),
    BrowserEngine {
        name: "Safari",
        token: "Safari/",
        versioning: Versioning::Safari,
    },
];

/// Minimum accepted major versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFloor {
    pub browser: u32,
    pub safari: u32,
}

impl VersionFloor {
    fn for_engine(&self, engine: &BrowserEngine) -> u32 {
        match engine.versioning {
            Versioning::Token => self.browser,
            Versioning::Safari => self.safari,
        }
    }
}

/// Result of classifying a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentClass {
    /// Recognized browser at or above the minimum version.
    Browser,
    /// Matched the automation signature with this pattern.
    Blocked(&'static str),
    /// Neither blocked nor a recent recognized browser.
    Unrecognized,
    /// No user agent at all.
    Missing,
}

/// Classify a user agent against the deny and browser tables.
pub fn classify(user_agent: Option<&str>, floor: VersionFloor) -> UserAgentClass {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return UserAgentClass::Missing;
    };

    if let Some(pattern) = blocked_pattern(ua) {
        return UserAgentClass::Blocked(pattern);
    }

    let Some(engine) = detect_engine(ua) else {
        return UserAgentClass::Unrecognized;
    };
    match engine_version(ua, engine) {
        Some(version) if version >= floor.for_engine(engine) => UserAgentClass::Browser,
        _ => UserAgentClass::Unrecognized,
    }
}

/// First deny pattern contained in the user agent.
pub fn blocked_pattern(ua: &str) -> Option<&'static str> {
    let lower = ua.to_ascii_lowercase();
    DENY_PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(pattern, _)| *pattern)
}

/// First engine whose token appears in the user agent.
pub fn detect_engine(ua: &str) -> Option<&'static BrowserEngine> {
    BROWSER_ENGINES.iter().find(|engine| ua.contains(engine.token))
}

/// Major release number the engine reports in this user agent.
pub fn engine_version(ua: &str, engine: &BrowserEngine) -> Option<u32> {
    match engine.versioning {
        Versioning::Token => version_after_marker(ua, engine.token),
        Versioning::Safari => version_after_marker(ua, "Version/"),
    }
}

fn version_after_marker(ua: &str, marker: &str) -> Option<u32> {
    let idx = ua.find(marker)?;
    let rest = &ua[idx + marker.len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: VersionFloor = VersionFloor {
        browser: 70,
        safari: 12,
    };

    const CHROME_120: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const FIREFOX_121: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const EDGE_119: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.2151.97";
    const SAFARI_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const SAFARI_5: &str = "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_6_8; en-us) AppleWebKit/533.21.1 (KHTML, like Gecko) Version/5.0.5 Safari/533.21.1";
    const CHROME_50: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";

    fn version_of(ua: &str) -> Option<(&'static str, u32)> {
        let engine = detect_engine(ua)?;
        engine_version(ua, engine).map(|v| (engine.name, v))
    }

    #[test]
    fn test_browsers_pass() {
        for ua in [CHROME_120, FIREFOX_121, EDGE_119, SAFARI_IOS] {
            assert_eq!(classify(Some(ua), FLOOR), UserAgentClass::Browser, "{ua}");
        }
    }

    #[test]
    fn test_old_chrome_is_not_rescued_by_safari_token() {
        assert_eq!(version_of(CHROME_50), Some(("Chrome", 50)));
        assert_eq!(classify(Some(CHROME_50), FLOOR), UserAgentClass::Unrecognized);
    }

    #[test]
    fn test_edge_token_takes_precedence() {
        assert_eq!(version_of(EDGE_119), Some(("Edge", 119)));
    }

    #[test]
    fn test_safari_judged_by_release_version() {
        assert_eq!(version_of(SAFARI_IOS), Some(("Safari", 17)));
        assert_eq!(version_of(SAFARI_5), Some(("Safari", 5)));
        assert_eq!(classify(Some(SAFARI_5), FLOOR), UserAgentClass::Unrecognized);
    }

    #[test]
    fn test_safari_without_release_token_is_unrecognized() {
        let ua = "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) Safari/605.1.15";
        assert_eq!(classify(Some(ua), FLOOR), UserAgentClass::Unrecognized);
    }

    #[test]
    fn test_tools_are_blocked() {
        let cases = [
            ("curl/8.4.0", "curl"),
            ("Wget/1.21.4", "wget"),
            ("python-requests/2.31.0", "python"),
            ("Go-http-client/1.1", "go-http-client"),
            ("aria2/1.36.0", "aria2"),
            ("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)", "bot"),
            ("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) HeadlessChrome/120.0.0.0 Safari/537.36", "headless"),
        ];
        for (ua, pattern) in cases {
            assert_eq!(classify(Some(ua), FLOOR), UserAgentClass::Blocked(pattern), "{ua}");
        }
    }

    #[test]
    fn test_deny_wins_over_browser_token() {
        let ua = format!("{CHROME_120} python-urllib");
        assert_eq!(classify(Some(&ua), FLOOR), UserAgentClass::Blocked("python"));
    }

    #[test]
    fn test_missing_and_unknown() {
        assert_eq!(classify(None, FLOOR), UserAgentClass::Missing);
        assert_eq!(classify(Some("   "), FLOOR), UserAgentClass::Missing);
        assert_eq!(classify(Some("Mozilla/5.0"), FLOOR), UserAgentClass::Unrecognized);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let lenient = VersionFloor { browser: 50, ..FLOOR };
        assert_eq!(classify(Some(CHROME_50), lenient), UserAgentClass::Browser);

        let strict = VersionFloor { browser: 121, ..FLOOR };
        assert_eq!(classify(Some(CHROME_120), strict), UserAgentClass::Unrecognized);

        let old_safari = VersionFloor { safari: 5, ..FLOOR };
        assert_eq!(classify(Some(SAFARI_5), old_safari), UserAgentClass::Browser);
    }
}
