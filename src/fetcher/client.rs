use crate::config::Config;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Redirect hops followed when fetching robots.txt
const ROBOTS_MAX_REDIRECTS: usize = 5;

/// Builds the HTTP client used for downloads
///
/// One client is built per process; it pools connections across requests
/// and is cheap to clone into worker tasks. It never follows redirects on
/// its own: every hop has to be checked against the request's whitelist,
/// which [`download_to_file`](crate::fetcher::download_to_file) does.
///
/// # Example
///
/// ```no_run
/// use ringtone_fetcher::config::Config;
/// use ringtone_fetcher::fetcher::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    base_builder(config).redirect(Policy::none()).build()
}

/// Builds the HTTP client used for robots.txt lookups
///
/// robots.txt is only evaluated, never stored, so a short redirect chain
/// (e.g. http to https) is followed automatically.
pub fn build_robots_client(config: &Config) -> Result<Client, reqwest::Error> {
    base_builder(config)
        .redirect(Policy::limited(ROBOTS_MAX_REDIRECTS))
        .build()
}

fn base_builder(config: &Config) -> ClientBuilder {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = config.user_agent.header_value();

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
}
