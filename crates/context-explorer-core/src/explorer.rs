//! Page generation pipeline.
//!
//! `ContextExplorer` ties the pieces together for one request:
//! cache lookup → manifest fetch → enrichment → rendering → cache store.

use crate::cache::{CacheGateway, CacheWrite, PageCache};
use crate::config::ExplorerConfig;
use crate::enrich::{EnrichedEntry, Enricher};
use crate::network::{HttpClient, ManifestSource};
use crate::render::{PageContext, Renderer};
use crate::urls::cache_key;
use crate::{ExplorerError, Result};
use std::sync::Arc;
use tracing::info;

/// A request for one repository page, parsed from
/// `/{owner}/{repo}/{page?}/{branch?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub owner: String,
    pub repo: String,
    /// Free-form third segment; accepted but not interpreted.
    pub page: Option<String>,
    pub branch: Option<String>,
}

impl PageRequest {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            page: None,
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Parse a request path. Segments past the fourth are ignored and empty
    /// optional segments count as absent.
    pub fn from_path(path: &str) -> Result<Self> {
        let mut segments = path.trim_start_matches('/').split('/');
        let mut next = || segments.next().filter(|s| !s.is_empty()).map(str::to_string);

        match (next(), next()) {
            (Some(owner), Some(repo)) => Ok(Self {
                owner,
                repo,
                page: next(),
                branch: next(),
            }),
            _ => Err(ExplorerError::InvalidPath {
                path: path.to_string(),
            }),
        }
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.owner, &self.repo, self.branch.as_deref())
    }
}

/// How a page was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Regenerated because the caller asked for a refresh.
    Refresh,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Refresh => "refresh",
        }
    }
}

/// A freshly generated page plus the data it was rendered from.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub html: String,
    pub manifest_url: String,
    pub warning: Option<String>,
    pub entries: Vec<EnrichedEntry>,
}

/// Result of serving a page request.
#[derive(Debug, Clone)]
pub struct ServedPage {
    pub html: String,
    pub cache: CacheStatus,
    /// `None` when the page came from the cache.
    pub write: Option<CacheWrite>,
}

/// Manifest enrichment service.
#[derive(Debug, Clone)]
pub struct ContextExplorer {
    manifests: ManifestSource,
    enricher: Enricher,
    renderer: Renderer,
    cache: CacheGateway,
}

impl ContextExplorer {
    /// Create an explorer with the given configuration and cache backend.
    pub fn new(config: &ExplorerConfig, cache: Arc<dyn PageCache>) -> Result<Self> {
        let http = HttpClient::new(config)?;
        Ok(Self {
            manifests: ManifestSource::new(http.clone(), config.manifest_base_url.clone()),
            enricher: Enricher::new(http, config),
            renderer: Renderer::new(config),
            cache: CacheGateway::new(cache),
        })
    }

    pub fn cache(&self) -> &CacheGateway {
        &self.cache
    }

    /// Serve a page, from cache unless `refresh` is set.
    ///
    /// Manifest-level failures are returned as errors and nothing is
    /// cached. The cache write completes before this returns.
    pub async fn serve(&self, request: &PageRequest, refresh: bool) -> Result<ServedPage> {
        let key = request.cache_key();

        if !refresh {
            if let Some(html) = self.cache.get(&key).await {
                return Ok(ServedPage {
                    html,
                    cache: CacheStatus::Hit,
                    write: None,
                });
            }
        }

        let page = self.generate(request).await?;
        let write = self.cache.put(&key, &page.html).await;

        Ok(ServedPage {
            html: page.html,
            cache: if refresh {
                CacheStatus::Refresh
            } else {
                CacheStatus::Miss
            },
            write: Some(write),
        })
    }

    /// Fetch, enrich and render without touching the cache.
    pub async fn generate(&self, request: &PageRequest) -> Result<GeneratedPage> {
        let branch = request.branch.as_deref();
        let fetched = self
            .manifests
            .fetch(&request.owner, &request.repo, branch)
            .await?;

        let entries = self
            .enricher
            .enrich_all(&request.owner, &request.repo, &fetched.manifest.context)
            .await;

        let failed = entries.iter().filter(|e| e.error.is_some()).count();
        info!(
            "Generated page for {} ({} entries, {} failed)",
            request.cache_key(),
            entries.len(),
            failed
        );

        let html = self.renderer.render_page(&PageContext {
            owner: &request.owner,
            repo: &request.repo,
            manifest_url: &fetched.url,
            warning: fetched.manifest.warning.as_deref(),
            attribution: fetched.manifest.attribution.as_deref(),
            entries: &entries,
        });

        Ok(GeneratedPage {
            html,
            manifest_url: fetched.url,
            warning: fetched.manifest.warning,
            entries,
        })
    }
}
