use std::path::Path;

/// Fallback name used when sanitization leaves nothing displayable
pub const FALLBACK_FILENAME: &str = "unnamed";

/// Sanitizes a client-supplied filename down to a safe basename.
///
/// The result is used for response echo and logging only, never for
/// filesystem access, so this is a total function: any input (including
/// empty or all-unsafe names) yields a usable name.
pub fn sanitize_filename(filename: &str) -> String {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components in client filename: {}", filename);
    }

    // Keep only the basename; both separator styles show up in the wild
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");

    // Remove dangerous characters, keep only safe ones
    // We allow most Unicode characters but block path separators and reserved characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    // No hidden files, no bare dot runs left over from traversal input
    let trimmed = sanitized.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lowercase extension of a filename, without the dot; empty when there is none.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
