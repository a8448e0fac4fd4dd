//! URL checks and local filename derivation for archive downloads.

mod path;
mod sanitize;

pub use path::last_path_segment;
pub use sanitize::sanitize_filename;

/// Local filename for an archive URL: last path segment, sanitized.
///
/// Returns `None` when the URL has no usable path segment.
///
/// - `archive_filename("https://www.cdc.gov/brfss/annual_data/2003/files/CDBRFS03XPT.zip")` → `Some("CDBRFS03XPT.zip")`
/// - `archive_filename("https://example.com/")` → `None`
pub fn archive_filename(url: &str) -> Option<String> {
    let raw = last_path_segment(url)?;
    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        None
    } else {
        Some(sanitized)
    }
}

/// Accepts only absolute `http` / `https` URLs with a host.
pub fn check_download_url(url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(url).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {:?}", other)),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
