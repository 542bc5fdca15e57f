//! Helpers for validating names used as filesystem path components.

/// Returns true if `name` is safe to use as a single path component on all platforms.
///
/// Rules:
/// - Must be non-empty and not "." or ".."
/// - Must not contain path separators ('/' or '\\')
/// - Must not contain control characters or NUL
/// - Must not contain Windows-reserved filename characters
/// - Must not end with '.' or space (Windows restriction)
pub fn is_safe_path_component(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.ends_with('.') || name.ends_with(' ') {
        return false;
    }

    for c in name.chars() {
        if c == '/' || c == '\\' || c == '\0' {
            return false;
        }
        if c.is_control() {
            return false;
        }
        // Windows-reserved filename characters.
        if matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            return false;
        }
    }

    true
}

/// Turn an arbitrary name into a safe path component.
///
/// Unsafe characters become `_`, trailing dots and spaces are dropped, and the
/// result is capped at `max_chars` characters. Returns `fallback` if nothing
/// usable is left.
pub fn sanitize_path_component(name: &str, max_chars: usize, fallback: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .take(max_chars)
        .collect();

    while out.ends_with('.') || out.ends_with(' ') {
        out.pop();
    }

    if is_safe_path_component(&out) {
        out
    } else {
        fallback.to_string()
    }
}
