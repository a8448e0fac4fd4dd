//! Filename hint from a URL path.

/// Last non-empty path segment of `url`, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_decode(segment);
    if decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

/// Decodes `%XX` escapes; malformed escapes are kept as-is.
fn percent_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            last_path_segment("https://example.com/a/b/CDBRFS04XPT.zip").as_deref(),
            Some("CDBRFS04XPT.zip")
        );
        assert_eq!(
            last_path_segment("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn trailing_slash_uses_previous_segment() {
        assert_eq!(
            last_path_segment("https://example.com/files/").as_deref(),
            Some("files")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(last_path_segment("https://example.com/"), None);
        assert_eq!(last_path_segment("https://example.com"), None);
    }

    #[test]
    fn with_query() {
        assert_eq!(
            last_path_segment("https://example.com/LLCP2012XPT.zip?token=abc").as_deref(),
            Some("LLCP2012XPT.zip")
        );
    }

    #[test]
    fn percent_escapes() {
        assert_eq!(
            last_path_segment("https://example.com/a%20b.zip").as_deref(),
            Some("a b.zip")
        );
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%E2%9C%93.zip"), "\u{2713}.zip");
        assert_eq!(percent_decode("bad%FF.zip"), "bad\u{FFFD}.zip");
    }
}
