//! Ringtone Fetcher: a policy-gated bulk file fetcher
//!
//! This crate admits candidate URLs through a domain whitelist and the target
//! site's robots.txt, downloads the admitted files concurrently under a bounded
//! budget, and packages the successful downloads into a single zip archive.

pub mod admission;
pub mod archive;
pub mod config;
pub mod fetcher;
pub mod robots;
pub mod server;
pub mod staging;
pub mod url;

use thiserror::Error;

/// Main error type for Ringtone Fetcher operations
#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Redirect from {url} to {target} leaves the whitelist")]
    OffWhitelist { url: String, target: String },

    #[error("Too many redirects starting at {url}")]
    TooManyRedirects { url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors that make a whole download request meaningless
///
/// These are surfaced to the caller as client errors before any download work
/// is started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("You must provide a non-empty 'whitelist' array of allowed domains.")]
    MissingWhitelist,

    #[error("No URLs provided")]
    NoUrls,

    #[error("No valid URLs after whitelist/robots.txt filtering")]
    NothingAdmitted,

    #[error("'limit' must be a positive integer")]
    InvalidLimit,

    #[error("'concurrency' must be a positive integer")]
    InvalidConcurrency,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

// Re-export commonly used types
pub use crate::admission::{admit, AdmittedUrl};
pub use crate::archive::{build_archive, ArchiveEntry};
pub use crate::config::Config;
pub use crate::fetcher::{fetch_all, FetchOutcome, OutcomeStatus};
pub use crate::robots::{CrawlPolicy, RobotsChecker};
pub use crate::url::{extract_domain, is_domain_allowed, Whitelist};
