//! Robots.txt handling module
//!
//! This module fetches, parses, and caches robots.txt files and answers
//! whether a URL may be retrieved. It is the second admission gate and is
//! fail-open: when the document cannot be obtained the URL is permitted.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::ParsedRobots;

use crate::config::Config;
use crate::{FetcherError, UrlError};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Largest robots.txt body that is evaluated; bytes beyond it are ignored
pub const ROBOTS_MAX_BYTES: usize = 500 * 1024;

/// Longest time a robots.txt document may stay cached
pub const MAX_ROBOTS_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Answers whether an already whitelisted URL may be fetched
pub trait CrawlPolicy {
    /// Returns `true` if the URL may be fetched
    fn is_permitted(&self, url: &Url) -> impl Future<Output = bool> + Send;
}

/// Builds the robots.txt URL for the origin of `url`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ringtone_fetcher::robots::robots_url;
///
/// let url = Url::parse("http://a.example.com:8080/tones/r.mp3?x=1").unwrap();
/// assert_eq!(
///     robots_url(&url).unwrap().as_str(),
///     "http://a.example.com:8080/robots.txt"
/// );
/// ```
pub fn robots_url(url: &Url) -> Result<Url, UrlError> {
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }
    url.join("/robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Fetches and parses robots.txt
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - A 2xx document, or allow-all for a 4xx answer
/// * `Err(FetcherError)` - Network error, timeout, or any other status
///
/// Only the first [`ROBOTS_MAX_BYTES`] of the document are evaluated.
pub async fn fetch_robots(
    client: &Client,
    robots_url: &Url,
    user_agent: &str,
    timeout: Duration,
) -> Result<ParsedRobots, FetcherError> {
    let url = robots_url.as_str();
    let mut response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_request_error(url, e))?;

    let status = response.status();
    if status.is_success() {
        let body = read_capped(&mut response, ROBOTS_MAX_BYTES)
            .await
            .map_err(|e| classify_request_error(url, e))?;
        Ok(ParsedRobots::from_content(&String::from_utf8_lossy(&body)))
    } else if status.is_client_error() {
        Ok(ParsedRobots::allow_all())
    } else {
        Err(FetcherError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Reads at most `limit` body bytes, dropping the connection after that
async fn read_capped(response: &mut Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            tracing::debug!(
                "robots.txt at {} exceeds {} bytes; ignoring the rest",
                response.url(),
                limit
            );
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn classify_request_error(url: &str, e: reqwest::Error) -> FetcherError {
    if e.is_timeout() {
        FetcherError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetcherError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Robots.txt gate with a per-origin document cache
///
/// One document is fetched per distinct origin. Successfully retrieved
/// documents (and allow-all answers for 4xx statuses) are cached for
/// `cache_ttl`; failed fetches are not cached so later requests retry.
pub struct RobotsChecker {
    client: Client,
    agent: String,
    user_agent_header: String,
    timeout: Duration,
    cache_ttl: chrono::Duration,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsChecker {
    /// Creates a checker
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `agent` - Agent token matched against robots.txt user-agent groups
    /// * `timeout` - Timeout for a single robots.txt fetch
    /// * `cache_ttl` - How long documents stay cached (zero disables caching,
    ///   longer than [`MAX_ROBOTS_CACHE_TTL`] is shortened to it)
    pub fn new(
        client: Client,
        agent: impl Into<String>,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        let agent = agent.into();
        let cache_ttl = cache_ttl.min(MAX_ROBOTS_CACHE_TTL);
        Self {
            client,
            user_agent_header: agent.clone(),
            agent,
            timeout,
            cache_ttl: chrono::Duration::from_std(cache_ttl)
                .unwrap_or_else(|_| chrono::Duration::weeks(1)),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a checker from the service configuration
    pub fn from_config(client: Client, config: &Config) -> Self {
        let mut checker = Self::new(
            client,
            config.user_agent.crawler_name.clone(),
            Duration::from_millis(config.fetch.robots_timeout_ms),
            Duration::from_secs(config.fetch.robots_cache_ttl_secs),
        );
        checker.user_agent_header = config.user_agent.header_value();
        checker
    }

    /// Checks whether `agent` may fetch `url` according to its origin's robots.txt
    ///
    /// Any failure to obtain the document permits the URL.
    pub async fn is_permitted_for(&self, url: &Url, agent: &str) -> bool {
        let robots_url = match robots_url(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Cannot derive robots.txt location for {}: {}; allowing", url, e);
                return true;
            }
        };
        let key = robots_url.as_str().to_string();

        if let Some(cached) = self.cached(&key) {
            tracing::debug!("Using cached robots.txt for {}", key);
            return cached.is_allowed(url.as_str(), agent);
        }

        tracing::debug!("Fetching robots.txt: {}", key);
        match fetch_robots(&self.client, &robots_url, &self.user_agent_header, self.timeout).await {
            Ok(robots) => {
                let allowed = robots.is_allowed(url.as_str(), agent);
                self.store(key, robots);
                allowed
            }
            Err(e) => {
                tracing::warn!("robots.txt unavailable ({}); allowing {}", e, url);
                true
            }
        }
    }

    fn cached(&self, key: &str) -> Option<CachedRobots> {
        if self.cache_ttl <= chrono::Duration::zero() {
            return None;
        }
        let mut cache = self.cache.lock().ok()?;
        match cache.get(key) {
            Some(entry) if !entry.is_stale(self.cache_ttl) => Some(entry.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: String, robots: ParsedRobots) {
        if self.cache_ttl <= chrono::Duration::zero() {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, CachedRobots::new(robots));
        }
    }
}

impl CrawlPolicy for RobotsChecker {
    async fn is_permitted(&self, url: &Url) -> bool {
        self.is_permitted_for(url, &self.agent).await
    }
}
