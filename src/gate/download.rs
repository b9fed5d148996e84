//! Download-attempt classification.
//!
//! Only requests for binary or attachment content are gated; ordinary page
//! navigation always passes.

use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;

use crate::gate::signals::header_str;

/// File extensions served as downloads.
pub const DOWNLOAD_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "epub", "csv",
    // archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "zst",
    // media
    "mp3", "mp4", "m4a", "wav", "flac", "ogg", "avi", "mkv", "mov", "webm",
    // images
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "svg", "ico",
    // executables and packages
    "exe", "msi", "dmg", "pkg", "apk", "deb", "rpm", "appimage", "iso", "bin",
];

const LANDING_PAGES: &[&str] = &["/", "/index.html", "/index.htm"];

/// Request path as the file server resolves it: percent-decoded, with empty
/// and `.` segments dropped. `None` if the decoded bytes are not UTF-8.
pub fn normalize_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    let mut normalized = String::with_capacity(decoded.len() + 1);
    for segment in decoded.split('/').filter(|s| !s.is_empty() && *s != ".") {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() || decoded.ends_with('/') {
        normalized.push('/');
    }
    Some(normalized)
}

/// Lowercased extension of the last path segment, if any.
pub fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True if the path ends in a download extension.
pub fn has_download_extension(path: &str) -> bool {
    path_extension(path)
        .map(|ext| DOWNLOAD_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// True if the request targets downloadable content by extension or headers.
pub fn is_download_attempt(path: &str, headers: &HeaderMap) -> bool {
    if has_download_extension(path) {
        return true;
    }

    let accept_wants_file = header_str(headers, header::ACCEPT)
        .map(|v| {
            let v = v.to_ascii_lowercase();
            v.contains("application/octet-stream") || v.contains("attachment")
        })
        .unwrap_or(false);
    if accept_wants_file {
        return true;
    }

    header_str(headers, header::CONTENT_DISPOSITION)
        .map(|v| v.to_ascii_lowercase().contains("attachment"))
        .unwrap_or(false)
}

/// True for the site's index page.
pub fn is_landing_page(path: &str) -> bool {
    path.is_empty() || LANDING_PAGES.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extension_table() {
        let cases = [
            ("/files/report.pdf", true),
            ("/files/REPORT.PDF", true),
            ("/dist/tool.tar.gz", true),
            ("/installer.exe", true),
            ("/photo.jpeg", true),
            ("/about.html", false),
            ("/", false),
            ("/docs/", false),
            ("/.zip", false),
            ("/archive.", false),
            ("/v1.2/readme", false),
        ];
        for (path, expected) in cases {
            assert_eq!(has_download_extension(path), expected, "path {path}");
        }
    }

    #[test]
    fn test_normalize_matches_file_server_resolution() {
        let cases = [
            ("/files/report%2Epdf", "/files/report.pdf"),
            ("/%66iles/report.pdf", "/files/report.pdf"),
            ("/files%2Freport.pdf", "/files/report.pdf"),
            ("//files/./report.pdf", "/files/report.pdf"),
            ("/files/", "/files/"),
            ("/", "/"),
            ("", "/"),
            ("/caf%C3%A9.zip", "/café.zip"),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_path(raw).as_deref(), Some(expected), "raw {raw}");
        }
        assert!(has_download_extension(&normalize_path("/files/report%2Epdf").unwrap()));
    }

    #[test]
    fn test_normalize_rejects_invalid_utf8() {
        assert_eq!(normalize_path("/files/%FF%FE.pdf"), None);
    }

    #[test]
    fn test_accept_octet_stream() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/octet-stream"));
        assert!(is_download_attempt("/get", &headers));
    }

    #[test]
    fn test_content_disposition_attachment() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("Attachment; filename=\"a\""),
        );
        assert!(is_download_attempt("/get", &headers));
    }

    #[test]
    fn test_plain_navigation_is_not_a_download() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,*/*;q=0.8"));
        assert!(!is_download_attempt("/about", &headers));
        assert!(!is_download_attempt("/", &HeaderMap::new()));
    }

    #[test]
    fn test_landing_pages() {
        assert!(is_landing_page("/"));
        assert!(is_landing_page(""));
        assert!(is_landing_page("/index.html"));
        assert!(!is_landing_page("/files/index.html"));
    }
}
