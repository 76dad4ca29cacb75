//! Streaming download of one URL into a staging file

use crate::url::Whitelist;
use crate::FetcherError;
use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

/// Size of the write buffer between the response body and the file
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Redirect hops followed for one download
pub const MAX_REDIRECTS: usize = 10;

/// Downloads `url` into `dest`, streaming the body chunk by chunk
///
/// Redirects are followed by hand, and only while every hop stays on a
/// whitelisted host. The final response URL is checked again before the
/// destination file is created.
///
/// The body is never held in memory as a whole: chunks are read from the
/// connection and pushed through a `CHUNK_SIZE` write buffer into the file.
/// On any failure after the file was created, the partial file is removed.
///
/// # Returns
///
/// * `Ok(u64)` - Number of body bytes written
/// * `Err(FetcherError)` - Non-2xx status, redirect off the whitelist, network
///   error, timeout, or local I/O error
pub async fn download_to_file(
    client: &Client,
    url: &Url,
    whitelist: &Whitelist,
    dest: &Path,
) -> Result<u64, FetcherError> {
    let mut response = send_within_whitelist(client, url, whitelist).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetcherError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if !whitelist.allows_url(response.url()) {
        return Err(FetcherError::OffWhitelist {
            url: url.to_string(),
            target: response.url().to_string(),
        });
    }

    let file = File::create(dest).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    match copy_body(&mut response, &mut writer, url).await {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(writer);
            if let Err(remove_err) = tokio::fs::remove_file(dest).await {
                tracing::debug!(
                    "Could not remove partial file {}: {}",
                    dest.display(),
                    remove_err
                );
            }
            Err(e)
        }
    }
}

/// Sends a GET for `url`, following redirects whose targets are whitelisted
async fn send_within_whitelist(
    client: &Client,
    url: &Url,
    whitelist: &Whitelist,
) -> Result<Response, FetcherError> {
    let mut current = url.clone();

    for _ in 0..=MAX_REDIRECTS {
        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| classify_error(&current, e))?;

        if !response.status().is_redirection() {
            return Ok(response);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let Some(location) = location else {
            return Ok(response);
        };

        let next = current.join(&location)?;
        if !whitelist.allows_url(&next) {
            tracing::warn!("Refusing redirect from {} to {}", current, next);
            return Err(FetcherError::OffWhitelist {
                url: url.to_string(),
                target: next.to_string(),
            });
        }

        tracing::debug!("Following redirect {} -> {}", current, next);
        current = next;
    }

    Err(FetcherError::TooManyRedirects {
        url: url.to_string(),
    })
}

async fn copy_body(
    response: &mut Response,
    writer: &mut BufWriter<File>,
    url: &Url,
) -> Result<u64, FetcherError> {
    let mut written: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(url, e))? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(written)
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetcherError {
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
