//! Context extraction: the bounded snippet of text around a matched address.
//!
//! The window is measured in characters, not bytes, so multi-byte text around an
//! address never splits a code point.

use crate::extraction::matcher::EmailMatcher;

pub const DEFAULT_CONTEXT_WINDOW: usize = 80;

/// Returns up to `window` characters on either side of the first case-insensitive
/// occurrence of `email` in `text`, with newlines replaced by spaces.
///
/// Returns an empty string when `email` does not occur in `text`.
pub fn context_snippet(text: &str, email: &str, window: usize) -> String {
    if text.is_empty() || email.is_empty() {
        return String::new();
    }

    // ASCII lowercasing keeps byte offsets identical between the two strings.
    let haystack = text.to_ascii_lowercase();
    let needle = email.to_ascii_lowercase();
    let Some(start) = haystack.find(&needle) else {
        return String::new();
    };
    let end = start + needle.len();

    let from = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    flatten_newlines(&text[from..to])
}

/// Pairs every address the matcher finds in `text` with its snippet, in matcher order.
pub fn emails_with_context(
    matcher: &EmailMatcher,
    text: &str,
    window: usize,
) -> Vec<(String, String)> {
    matcher
        .extract(text)
        .into_iter()
        .map(|email| {
            let snippet = context_snippet(text, &email, window);
            (email, snippet)
        })
        .collect()
}

fn flatten_newlines(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
