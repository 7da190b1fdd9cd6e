//! Character-safe string helpers

/// First `max_chars` characters of `s`.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Truncate to `max_chars` characters, appending "..." when anything was cut
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", take_chars(s, max_chars))
    } else {
        s.to_string()
    }
}
