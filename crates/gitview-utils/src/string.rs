//! Escaping, padding and trimming helpers.

use regex::Regex;

use crate::{Result, StringError};

/// Length a short log message is trimmed to.
pub const SHORT_LOG_LENGTH: usize = 60;

const ELLIPSIS: &str = "...";

/// Returns true if the value is missing or contains only whitespace.
pub fn is_empty(value: Option<&str>) -> bool {
    value.is_none_or(is_blank)
}

/// Returns true if the value contains only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Replaces CRLF, CR and LF line endings with `<br/>`.
pub fn break_lines_for_html(s: &str) -> String {
    s.replace("\r\n", "<br/>")
        .replace('\r', "<br/>")
        .replace('\n', "<br/>")
}

/// Escapes `&`, `<`, `>` and `"` for HTML.
///
/// With `change_space`, spaces become `&nbsp;` and tabs become
/// ` &nbsp; &nbsp;` so whitespace survives in rendered markup.
/// Already-escaped entities are escaped again.
pub fn escape_for_html(s: &str, change_space: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            ' ' if change_space => out.push_str("&nbsp;"),
            '\t' if change_space => out.push_str(" &nbsp; &nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encodes `/` and space for use in a URL parameter value.
pub fn encode_url(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '/' => out.push_str("%2F"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

/// Joins values with a single space.
pub fn flatten_strings_default<S: AsRef<str>>(values: &[S]) -> String {
    flatten_strings(values, " ")
}

/// Joins values with `separator`, trimming surrounding whitespace.
pub fn flatten_strings<S: AsRef<str>>(values: &[S], separator: &str) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(value.as_ref());
        out.push_str(separator);
    }
    out.trim().to_string()
}

/// Truncates `value` to `max` characters, ending in `...` when shortened.
pub fn trim_string(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    if max < ELLIPSIS.len() {
        return ELLIPSIS[..max].to_string();
    }
    let mut out: String = value.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Trims a commit's short message for log listings.
pub fn trim_short_log(s: &str) -> String {
    trim_string(s, SHORT_LOG_LENGTH)
}

/// Left-pads `input` with `pad` to `length` characters.
pub fn left_pad(input: &str, length: usize, pad: char) -> String {
    let count = input.chars().count();
    if count >= length {
        return input.to_string();
    }
    let mut out: String = std::iter::repeat_n(pad, length - count).collect();
    out.push_str(input);
    out
}

/// Right-pads `input` with `pad` to `length` characters.
pub fn right_pad(input: &str, length: usize, pad: char) -> String {
    let count = input.chars().count();
    if count >= length {
        return input.to_string();
    }
    let mut out = String::with_capacity(length);
    out.push_str(input);
    out.extend(std::iter::repeat_n(pad, length - count));
    out
}

/// Returns the parent portion of a `/`-separated path, or an empty string.
pub fn get_root_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Returns `full_path` relative to `base_path` with `/` separators.
///
/// A full path outside the base is returned normalised but otherwise intact.
pub fn get_relative_path(base_path: &str, full_path: &str) -> String {
    let relative = full_path
        .strip_prefix(base_path)
        .unwrap_or(full_path)
        .replace('\\', "/");
    match relative.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => relative,
    }
}

/// Splits on single spaces, dropping empty chunks.
pub fn get_strings_from_value_default(value: &str) -> Vec<String> {
    split_trimmed(value, " ")
}

/// Splits `value` on the `separator` regular expression.
///
/// Chunks are trimmed and empty chunks dropped.
pub fn get_strings_from_value(value: &str, separator: &str) -> Result<Vec<String>> {
    let re = Regex::new(separator).map_err(|source| StringError::InvalidPattern {
        pattern: separator.to_string(),
        source,
    })?;
    Ok(re
        .split(value)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(String::from)
        .collect())
}

fn split_trimmed(value: &str, separator: &str) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(String::from)
        .collect()
}
