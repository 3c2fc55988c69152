//! Email pattern matcher: scans free text for email-shaped substrings.

use std::collections::BTreeSet;

use regex::Regex;

/// `local-part@domain.tld`, tld being two or more letters.
const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// Stricter whole-string shape used before an address is handed to a mailer.
const ADDRESS_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";

/// Compiled email patterns. Built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct EmailMatcher {
    scan: Regex,
    address: Regex,
}

impl EmailMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            scan: Regex::new(EMAIL_PATTERN)?,
            address: Regex::new(ADDRESS_PATTERN)?,
        })
    }

    /// Returns every distinct match in `text`, sorted ascending.
    ///
    /// Dedupe is on the exact string: `Bob@acme.io` and `bob@acme.io` are two entries.
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.scan
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whole-string validity check, stricter than the scan pattern.
    pub fn is_valid_address(&self, addr: &str) -> bool {
        if !self.address.is_match(addr) {
            return false;
        }
        let Some((local, domain)) = addr.split_once('@') else {
            return false;
        };
        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return false;
        }
        domain
            .split('.')
            .all(|label| !label.starts_with('-') && !label.ends_with('-'))
    }
}
