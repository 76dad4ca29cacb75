/// Checks if a host is covered by a single whitelist entry
///
/// A host is covered when it equals the entry or is a strict subdomain of it.
/// Subdomains are recognised by a suffix match on `"." + entry`, so a host
/// that merely ends with the entry's text (e.g. `evil-example.com` for
/// `example.com`) is not covered.
///
/// Both arguments are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use ringtone_fetcher::url::host_matches;
///
/// assert!(host_matches("example.com", "example.com"));
/// assert!(host_matches("example.com", "cdn.example.com"));
/// assert!(!host_matches("example.com", "evil-example.com"));
/// assert!(!host_matches("example.com", "example.org"));
/// ```
pub fn host_matches(entry: &str, host: &str) -> bool {
    if entry.is_empty() {
        return false;
    }
    host == entry || host.ends_with(&format!(".{}", entry))
}
