//! Utilities for sanitizing caller-supplied text before it reaches the log.
//!
//! The request log is line oriented, so anything a caller controls (targets,
//! payload parse errors) must not be able to inject line breaks or control
//! characters, and must not grow a line without bound.

/// Longest value written into a single log field, in characters.
pub const MAX_LOG_VALUE_CHARS: usize = 256;

/// Removes control characters (including newlines and tabs) from a value.
pub fn strip_control_chars(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

/// Sanitizes a value for a `key=value` log field.
///
/// Control characters are removed, spaces are replaced with `_` so the field
/// stays one token, and the result is truncated to [`MAX_LOG_VALUE_CHARS`].
pub fn sanitize_log_value(value: &str) -> String {
    let cleaned: String = strip_control_chars(value)
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();

    let char_count = cleaned.chars().count();
    if char_count > MAX_LOG_VALUE_CHARS {
        let truncated: String = cleaned.chars().take(MAX_LOG_VALUE_CHARS).collect();
        format!("{truncated}...(truncated,{char_count}chars)")
    } else {
        cleaned
    }
}
