//! Fetcher module for downloading admitted files
//!
//! This module contains the download side of the pipeline:
//! - Building the shared HTTP client with a proper user agent
//! - Streaming a single response body to a staging file, following only
//!   redirects that stay inside the whitelist
//! - Running all downloads under a semaphore-bounded worker pool
//! - Recording one immutable outcome per admitted URL

mod client;
mod download;
mod outcome;
mod pool;

pub use client::{build_http_client, build_robots_client};
pub use download::{download_to_file, CHUNK_SIZE, MAX_REDIRECTS};
pub use outcome::{FetchOutcome, OutcomeStatus};
pub use pool::fetch_all;
