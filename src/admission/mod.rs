//! URL admission
//!
//! Admission runs the two gates over the candidate list, in input order:
//!
//! 1. The domain whitelist (pure, fail-closed). Rejected URLs never cause
//!    network traffic.
//! 2. The crawl policy (robots.txt, fail-open). Consulted only for URLs the
//!    whitelist accepted.
//!
//! Evaluation stops as soon as `limit` URLs are admitted; later candidates
//! are not looked at.

use crate::robots::CrawlPolicy;
use crate::url::Whitelist;
use crate::RequestError;
use url::Url;

/// A URL that passed both admission gates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedUrl {
    /// Zero-based position in admission order
    pub index: usize,

    /// The admitted URL
    pub url: Url,
}

/// Admits candidate URLs, preserving input order
///
/// # Arguments
///
/// * `urls` - Candidate URL strings, in caller order
/// * `whitelist` - Raw whitelist domains; must contain at least one usable entry
/// * `limit` - Maximum number of URLs to admit; must be positive
/// * `policy` - The crawl policy consulted for whitelisted URLs
///
/// # Returns
///
/// * `Ok(Vec<AdmittedUrl>)` - Between 1 and `limit` admitted URLs, in input order
/// * `Err(RequestError)` - Missing whitelist, zero limit, or nothing admitted
pub async fn admit<S, W, P>(
    urls: &[S],
    whitelist: &[W],
    limit: usize,
    policy: &P,
) -> Result<Vec<AdmittedUrl>, RequestError>
where
    S: AsRef<str>,
    W: AsRef<str>,
    P: CrawlPolicy,
{
    let whitelist = Whitelist::new(whitelist)?;
    admit_with(urls, &whitelist, limit, policy).await
}

/// Same as [`admit`] with an already built [`Whitelist`]
pub async fn admit_with<S, P>(
    urls: &[S],
    whitelist: &Whitelist,
    limit: usize,
    policy: &P,
) -> Result<Vec<AdmittedUrl>, RequestError>
where
    S: AsRef<str>,
    P: CrawlPolicy,
{
    if limit == 0 {
        return Err(RequestError::InvalidLimit);
    }

    let mut admitted = Vec::with_capacity(limit.min(urls.len()));

    for candidate in urls {
        if admitted.len() >= limit {
            break;
        }

        let candidate = candidate.as_ref();
        let url = match Url::parse(candidate) {
            Ok(url) if whitelist.allows_url(&url) => url,
            _ => {
                tracing::debug!("Skipping {}: host not whitelisted", candidate);
                continue;
            }
        };

        if !policy.is_permitted(&url).await {
            tracing::info!("Skipping {}: disallowed by robots.txt", url);
            continue;
        }

        admitted.push(AdmittedUrl {
            index: admitted.len(),
            url,
        });
    }

    if admitted.is_empty() {
        return Err(RequestError::NothingAdmitted);
    }

    tracing::info!(
        "Admitted {} of {} candidate URLs (limit {})",
        admitted.len(),
        urls.len(),
        limit
    );

    Ok(admitted)
}
