//! Deterministic URL and cache-key derivation.
//!
//! Everything here is pure: the same inputs always produce the same string,
//! which keeps rendered pages byte-stable across regenerations.

use crate::config::AppConfig;
use crate::manifest::Entry;
use serde_json::Number;
use url::form_urlencoded;

/// Cache key for a rendered page: `owner/repo/tree/branch`.
pub fn cache_key(owner: &str, repo: &str, branch: Option<&str>) -> String {
    format!(
        "{}/{}/tree/{}",
        owner,
        repo,
        branch_or_default(branch)
    )
}

/// Raw-content URL of the manifest on the given branch.
pub fn manifest_url(base: &str, owner: &str, repo: &str, branch: Option<&str>) -> String {
    format!(
        "{}/{}/{}/refs/heads/{}/{}",
        base,
        owner,
        repo,
        branch_or_default(branch),
        AppConfig::MANIFEST_FILE_NAME
    )
}

/// Query string for an entry's retrieval filters.
///
/// Only present fields contribute. List fields repeat the parameter name
/// once per element, in list order.
pub fn retrieval_query(entry: &Entry) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    let lists = [
        ("basePath", &entry.base_path),
        ("pathPatterns", &entry.path_patterns),
        ("excludePathPatterns", &entry.exclude_path_patterns),
    ];
    for (name, values) in lists {
        for value in values.iter().flatten() {
            query.append_pair(name, value);
        }
    }

    if let Some(max) = &entry.max_file_size {
        query.append_pair("maxFileSize", &number_string(max));
    }

    query.finish()
}

/// Retrieval service URL for an entry. The service always reads the `main`
/// tree; the `?` separator is emitted even when the query is empty.
pub fn retrieval_url(base: &str, owner: &str, repo: &str, entry: &Entry) -> String {
    format!(
        "{}/{}/{}/tree/main?{}",
        base,
        owner,
        repo,
        retrieval_query(entry)
    )
}

/// Launch URL that opens the prompt runner preloaded with the retrieval URL
/// and the prompt text.
pub fn prompt_url(base: &str, retrieval_url: &str, prompt: Option<&str>) -> String {
    let text = match prompt {
        Some(prompt) => format!("{}\n\n{}", retrieval_url, prompt),
        None => retrieval_url.to_string(),
    };
    format!("{}/?q={}", base, urlencoding::encode(&text))
}

/// Badge image for a slug; the badge host expects underscores.
pub fn badge_url(base: &str, slug: &str) -> String {
    format!("{}/{}", base, slug.replace('-', "_"))
}

/// Plain decimal form of a JSON number. Whole floats drop the fraction, so
/// `1e6` and `100000.0` read the same as their integer spellings.
fn number_string(number: &Number) -> String {
    if let Some(n) = number.as_u64() {
        return n.to_string();
    }
    if let Some(n) = number.as_i64() {
        return n.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

fn branch_or_default(branch: Option<&str>) -> &str {
    match branch {
        Some(b) if !b.is_empty() => b,
        _ => AppConfig::DEFAULT_BRANCH,
    }
}
