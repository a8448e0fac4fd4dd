//! Filename sanitization for archives written into the destination directory.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Makes a URL-derived name safe to join onto the destination directory.
///
/// - Replaces NUL, `/`, `\`, control characters and whitespace with `_`
/// - Collapses runs of `_`
/// - Trims leading/trailing dots and underscores (no hidden files, no `..`)
/// - Truncates to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        if unsafe_char || c == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
