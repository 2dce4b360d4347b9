//! Utilities for sanitizing text scraped from pages or produced by errors.
//!
//! Removes control characters before text is stored in the database and caps
//! its length.

/// Removes control characters (0x00-0x1F except tab/newline/carriage return).
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes `text` and truncates it to at most `max_chars` characters.
///
/// Truncation happens on character boundaries and appends a note with the
/// original length.
pub fn sanitize_and_truncate(text: &str, max_chars: usize) -> String {
    let sanitized = sanitize_text(text);
    let length = sanitized.chars().count();
    if length <= max_chars {
        return sanitized;
    }
    let kept: String = sanitized.chars().take(max_chars).collect();
    format!("{kept}... (truncated, original length: {length} chars)")
}
