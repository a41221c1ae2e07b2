//! Entry enrichment.
//!
//! Each manifest entry is resolved independently: build its retrieval URL,
//! fetch the extracted content with the bearer credential, and derive the
//! token estimate and prompt launch URL. A failing entry records its error
//! and never affects the others.

use crate::config::ExplorerConfig;
use crate::manifest::{Entry, EntrySlot};
use crate::network::HttpClient;
use crate::urls::{prompt_url, retrieval_url};
use crate::{ExplorerError, Result};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, warn};

/// A manifest entry resolved against the retrieval service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEntry {
    pub slug: String,
    #[serde(flatten)]
    pub entry: Entry,
    pub retrieval_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichedEntry {
    fn unresolved(slug: &str, entry: Entry, retrieval_url: String) -> Self {
        Self {
            slug: slug.to_string(),
            entry,
            retrieval_url,
            content: None,
            token_count: None,
            prompt_url: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.content.is_some()
    }
}

/// Approximate token count: content length divided by five, rounded.
///
/// Length is counted in UTF-16 code units so non-ASCII content yields the
/// same estimate a browser-side `length` would.
pub fn token_estimate(content: &str) -> u64 {
    let len = content.encode_utf16().count() as u64;
    // n / 5 never lands on .5 for integer n, so this is round-to-nearest.
    (len + 2) / 5
}

/// Resolves manifest entries against the retrieval service.
#[derive(Debug, Clone)]
pub struct Enricher {
    http: HttpClient,
    retrieval_base_url: String,
    prompt_base_url: String,
    token: String,
    max_concurrent: usize,
}

impl Enricher {
    pub fn new(http: HttpClient, config: &ExplorerConfig) -> Self {
        Self {
            http,
            retrieval_base_url: config.retrieval_base_url.clone(),
            prompt_base_url: config.prompt_base_url.clone(),
            token: config.retrieval_token.clone(),
            max_concurrent: config.max_concurrent_fetches.max(1),
        }
    }

    /// Enrich every entry, returning one record per slug in manifest order.
    pub async fn enrich_all(
        &self,
        owner: &str,
        repo: &str,
        entries: &[(String, EntrySlot)],
    ) -> Vec<EnrichedEntry> {
        let futures: Vec<_> = entries
            .iter()
            .map(|(slug, slot)| self.enrich_slot(owner, repo, slug, slot).boxed())
            .collect();
        stream::iter(futures)
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn enrich_slot(
        &self,
        owner: &str,
        repo: &str,
        slug: &str,
        slot: &EntrySlot,
    ) -> EnrichedEntry {
        match slot {
            EntrySlot::Valid(entry) => self.enrich(owner, repo, slug, entry).await,
            EntrySlot::Invalid { message } => {
                let entry = Entry::default();
                let url = retrieval_url(&self.retrieval_base_url, owner, repo, &entry);
                let mut enriched = EnrichedEntry::unresolved(slug, entry, url);
                let err = ExplorerError::InvalidEntry {
                    message: message.clone(),
                };
                warn!("Skipping entry '{}': {}", slug, err);
                enriched.error = Some(err.to_string());
                enriched
            }
        }
    }

    /// Enrich a single entry.
    pub async fn enrich(&self, owner: &str, repo: &str, slug: &str, entry: &Entry) -> EnrichedEntry {
        let url = retrieval_url(&self.retrieval_base_url, owner, repo, entry);
        let mut enriched = EnrichedEntry::unresolved(slug, entry.clone(), url);

        match self.retrieve(&enriched.retrieval_url).await {
            Ok(content) => {
                enriched.token_count = Some(token_estimate(&content));
                if let Some(prompt) = entry.prompt.as_deref() {
                    enriched.prompt_url = Some(prompt_url(
                        &self.prompt_base_url,
                        &enriched.retrieval_url,
                        Some(prompt),
                    ));
                }
                debug!(
                    "Enriched '{}' ({} tokens)",
                    slug,
                    enriched.token_count.unwrap_or_default()
                );
                enriched.content = Some(content);
            }
            Err(err) => {
                warn!("Enrichment failed for '{}': {}", slug, err);
                enriched.error = Some(describe_failure(&err));
            }
        }

        enriched
    }

    async fn retrieve(&self, url: &str) -> Result<String> {
        let response = self.http.get_with_bearer(url, &self.token).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::RetrievalStatus {
                status: status.as_u16(),
            });
        }
        self.http.read_text(response).await
    }
}

fn describe_failure(err: &ExplorerError) -> String {
    if err.is_entry_level() {
        err.to_string()
    } else {
        format!("Error fetching context: {}", err)
    }
}
