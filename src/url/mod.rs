//! URL handling module for Ringtone Fetcher
//!
//! This module provides host extraction, the domain whitelist used as the
//! first admission gate, and the staging file naming scheme.

mod domain;
mod matcher;
mod naming;

use crate::RequestError;
use url::{Host, Url};

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::host_matches;
pub use naming::{sanitize_file_name, storage_file_name};

/// Caller-supplied set of domains outside which nothing may be fetched
///
/// Entries are trimmed, lowercased and IDNA-normalized so they compare equal
/// to the hosts produced by URL parsing. Blank entries are dropped. A
/// whitelist with no usable entries cannot be constructed: absence of a
/// whitelist is a request failure, never an open default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    entries: Vec<String>,
}

impl Whitelist {
    /// Builds a whitelist from raw domain strings
    ///
    /// # Returns
    ///
    /// * `Ok(Whitelist)` - At least one usable entry was supplied
    /// * `Err(RequestError::MissingWhitelist)` - No usable entries
    pub fn new<I, S>(entries: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| normalize_entry(entry.as_ref()))
            .collect();
        normalized.dedup();

        if normalized.is_empty() {
            return Err(RequestError::MissingWhitelist);
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// Returns the normalized entries
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Checks a lowercase host against every entry
    pub fn allows_host(&self, host: &str) -> bool {
        self.entries.iter().any(|entry| host_matches(entry, host))
    }

    /// Checks the host of a parsed URL; host-less URLs are rejected
    pub fn allows_url(&self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) => self.allows_host(&host),
            None => false,
        }
    }

    /// Checks a raw URL string; malformed URLs are rejected
    pub fn allows(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.allows_url(&parsed),
            Err(_) => false,
        }
    }
}

/// Checks whether a URL's host is covered by a list of whitelist domains
///
/// Fails closed: malformed URLs, host-less URLs and empty whitelists all
/// yield `false`.
///
/// # Examples
///
/// ```
/// use ringtone_fetcher::url::is_domain_allowed;
///
/// assert!(is_domain_allowed("http://a.example.com/r.mp3", &["example.com"]));
/// assert!(!is_domain_allowed("http://evil.com/r.mp3", &["example.com"]));
/// assert!(!is_domain_allowed("not a url", &["example.com"]));
/// assert!(!is_domain_allowed("http://example.com/", &[] as &[&str]));
/// ```
pub fn is_domain_allowed<S: AsRef<str>>(url: &str, whitelist: &[S]) -> bool {
    match Whitelist::new(whitelist) {
        Ok(list) => list.allows(url),
        Err(_) => false,
    }
}

fn normalize_entry(entry: &str) -> Option<String> {
    let trimmed = entry.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    match Host::parse(&lowered) {
        Ok(host) => Some(host.to_string()),
        Err(_) => Some(lowered),
    }
}
