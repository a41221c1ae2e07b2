//! Manifest fetcher for the raw-content host.

use crate::manifest::Manifest;
use crate::network::client::HttpClient;
use crate::urls::manifest_url;
use crate::{ExplorerError, Result};
use tracing::{debug, warn};

/// A manifest together with the URL it was read from.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub url: String,
    pub manifest: Manifest,
}

/// Reads `context.json` from `<base>/<owner>/<repo>/refs/heads/<branch>/`.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    http: HttpClient,
    base_url: String,
}

impl ManifestSource {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// URL the manifest would be fetched from.
    pub fn url_for(&self, owner: &str, repo: &str, branch: Option<&str>) -> String {
        manifest_url(&self.base_url, owner, repo, branch)
    }

    /// Fetch and parse the manifest.
    ///
    /// Any non-success status is reported as [`ExplorerError::ManifestNotFound`]
    /// carrying the attempted URL. A schema mismatch is not an error; it is
    /// reported through [`Manifest::warning`].
    pub async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
    ) -> Result<FetchedManifest> {
        let url = self.url_for(owner, repo, branch);
        let response = self.http.get(&url).await?;

        if !response.status().is_success() {
            debug!("Manifest fetch returned {} for {}", response.status(), url);
            return Err(ExplorerError::ManifestNotFound { url });
        }

        let body = self.http.read_text(response).await?;
        let manifest = Manifest::parse(&body)?;
        if let Some(warning) = &manifest.warning {
            warn!("{} ({})", warning, url);
        }

        Ok(FetchedManifest { url, manifest })
    }
}
