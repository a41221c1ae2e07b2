//! Network access for the two upstream services.
//!
//! This module provides:
//! - An HTTP client with bounded timeouts and bearer auth
//! - The manifest fetcher for the raw-content host

mod client;
mod manifest_source;

pub use client::{extract_domain, HttpClient};
pub use manifest_source::{FetchedManifest, ManifestSource};
