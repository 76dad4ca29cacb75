use serde::Deserialize;

/// Main configuration structure for Ringtone Fetcher
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on (e.g. "127.0.0.1:8000")
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Admission and download behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Admission cap applied when a request omits `limit`
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,

    /// Download parallelism applied when a request omits `concurrency`
    #[serde(rename = "default-concurrency", default = "default_concurrency")]
    pub default_concurrency: usize,

    /// Upper bound for a request's `concurrency`
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for a single robots.txt fetch (milliseconds)
    #[serde(rename = "robots-timeout-ms", default = "default_robots_timeout_ms")]
    pub robots_timeout_ms: u64,

    /// How long a fetched robots.txt stays valid (seconds, 0 disables caching)
    #[serde(
        rename = "robots-cache-ttl-secs",
        default = "default_robots_cache_ttl_secs"
    )]
    pub robots_cache_ttl_secs: u64,

    /// TCP connect timeout for downloads (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Overall timeout for one download (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_concurrency: default_concurrency(),
            max_concurrency: default_max_concurrency(),
            robots_timeout_ms: default_robots_timeout_ms(),
            robots_cache_ttl_secs: default_robots_cache_ttl_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the fetcher, also used as the robots.txt agent token
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the fetcher
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the fetcher
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_concurrency() -> usize {
    5
}

fn default_max_concurrency() -> usize {
    32
}

fn default_robots_timeout_ms() -> u64 {
    5_000
}

fn default_robots_cache_ttl_secs() -> u64 {
    3_600
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_crawler_name() -> String {
    "RingtoneFetcher".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/bot".to_string()
}
