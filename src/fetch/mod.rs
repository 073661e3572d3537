//! Remote artifact fetching.
//!
//! The fetch contract is deliberately narrow: one HTTP GET, one attempt, the
//! whole payload in memory, or a [`PrimerError::Transport`]. No retries, no
//! backoff, and no explicit timeout beyond the transport's defaults — the
//! orchestrator treats any transport failure as a reason to abort before (or
//! roll back after) touching the filesystem, so a fancier policy here would
//! buy nothing.
//!
//! [`ArtifactFetcher`] is the seam the update pipeline is generic over; the
//! production implementation is [`HttpFetcher`], and tests substitute stubs
//! to simulate every failure mode without a network.

use std::future::Future;

use tracing::debug;

use crate::core::PrimerError;
use crate::utils::progress::download_bar;

/// A single-attempt byte fetcher.
///
/// Contract: `fetch(url)` performs exactly one request and resolves to the
/// complete payload, or to [`PrimerError::Transport`] for a connection
/// failure, a non-2xx response, or an empty body. Implementations must not
/// retry.
pub trait ArtifactFetcher {
    /// Fetch the full payload at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, PrimerError>> + Send;
}

/// Fetch a payload and decode it as UTF-8 text.
///
/// Used for the latest-version endpoint, whose body is a bare semver string.
pub async fn fetch_string<F: ArtifactFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<String, PrimerError> {
    let bytes = fetcher.fetch(url).await?;
    String::from_utf8(bytes).map_err(|_| PrimerError::Transport {
        url: url.to_string(),
        reason: "response body is not valid UTF-8".to_string(),
    })
}

/// Production fetcher over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PrimerError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| PrimerError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrimerError::Transport {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let bar = download_bar(response.content_length());
        let mut response = response;
        let mut payload = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    payload.extend_from_slice(&chunk);
                    bar.inc(chunk.len() as u64);
                }
                Ok(None) => break,
                Err(e) => {
                    bar.finish_and_clear();
                    return Err(PrimerError::Transport {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        bar.finish_and_clear();

        if payload.is_empty() {
            return Err(PrimerError::Transport {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        debug!("fetched {} bytes from {}", payload.len(), url);
        Ok(payload)
    }
}
