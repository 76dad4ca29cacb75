//! Bounded-concurrency download pool
//!
//! One task is spawned per admitted URL. Each task waits for a permit from a
//! semaphore sized to the requested concurrency before touching the network,
//! so no more than `concurrency` downloads are ever in flight. The permit is
//! held for the whole transfer and released when the task ends, however it
//! ends.
//!
//! Tasks live in a [`JoinSet`]: if the caller stops waiting (the request is
//! dropped), every queued and running download is aborted with it.

use crate::admission::AdmittedUrl;
use crate::fetcher::download::download_to_file;
use crate::fetcher::outcome::FetchOutcome;
use crate::url::{storage_file_name, Whitelist};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Downloads every admitted URL into `staging_dir`
///
/// Individual failures are recorded in the returned outcomes and never abort
/// sibling downloads. Every task is awaited before returning, so the result
/// holds exactly one outcome per admitted URL, ordered by admission index.
/// Dropping the returned future aborts all downloads still pending.
///
/// # Arguments
///
/// * `client` - Shared HTTP client (cloned cheaply into each task)
/// * `admitted` - URLs to download
/// * `whitelist` - Hosts that redirects may lead to
/// * `concurrency` - Maximum number of simultaneous downloads (0 is treated as 1)
/// * `staging_dir` - Directory receiving one file per successful download
pub async fn fetch_all(
    client: &Client,
    admitted: &[AdmittedUrl],
    whitelist: &Whitelist,
    concurrency: usize,
    staging_dir: &Path,
) -> Vec<FetchOutcome> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let whitelist = Arc::new(whitelist.clone());
    let mut tasks = JoinSet::new();

    for item in admitted {
        let dest = staging_dir.join(storage_file_name(&item.url, item.index));
        tasks.spawn(fetch_one(
            client.clone(),
            Arc::clone(&semaphore),
            Arc::clone(&whitelist),
            item.clone(),
            dest,
        ));
    }

    let mut outcomes = Vec::with_capacity(admitted.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Download task did not complete: {}", e),
        }
    }

    // A task that panicked left no outcome behind; record it as failed
    let finished: HashSet<usize> = outcomes.iter().map(|o| o.index).collect();
    for item in admitted.iter().filter(|item| !finished.contains(&item.index)) {
        outcomes.push(FetchOutcome::failed(
            item.index,
            item.url.as_str(),
            "download task did not complete",
        ));
    }
    outcomes.sort_by_key(|outcome| outcome.index);

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    tracing::info!(
        "Downloads finished: {} succeeded, {} failed",
        succeeded,
        outcomes.len() - succeeded
    );

    outcomes
}

async fn fetch_one(
    client: Client,
    semaphore: Arc<Semaphore>,
    whitelist: Arc<Whitelist>,
    item: AdmittedUrl,
    dest: PathBuf,
) -> FetchOutcome {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return FetchOutcome::failed(item.index, item.url.as_str(), e.to_string()),
    };

    tracing::debug!("Downloading {} -> {}", item.url, dest.display());

    match download_to_file(&client, &item.url, &whitelist, &dest).await {
        Ok(bytes) => {
            tracing::debug!("Saved {} ({} bytes)", item.url, bytes);
            FetchOutcome::saved(item.index, item.url.as_str(), dest, bytes)
        }
        Err(e) => {
            tracing::warn!("Download failed for {}: {}", item.url, e);
            FetchOutcome::failed(item.index, item.url.as_str(), e.to_string())
        }
    }
}
