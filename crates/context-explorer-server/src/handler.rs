//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use context_explorer::{is_editor_client, CacheWrite, ExplorerError, PageRequest, ServedPage};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const X_CACHE: &str = "x-cache";

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Reports whether the caller is the desktop editor client.
pub async fn handle_client_check(headers: HeaderMap) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let body = if is_editor_client(user_agent) {
        "true"
    } else {
        "false"
    };
    ([(header::CONTENT_TYPE, TEXT)], body)
}

/// Repository page handler: `GET /{owner}/{repo}/{page?}/{branch?}[?refresh]`.
pub async fn handle_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let request = match PageRequest::from_path(uri.path()) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };
    let refresh = query.contains_key("refresh");
    debug!("Page request {} (refresh: {})", request.cache_key(), refresh);

    match state.explorer.serve(&request, refresh).await {
        Ok(page) => page_response(page),
        Err(e) => {
            error!("Page generation failed for {}: {}", request.cache_key(), e);
            error_response(&e)
        }
    }
}

fn page_response(page: ServedPage) -> Response {
    let cache_header = match page.write {
        Some(CacheWrite::Failed) => "write-failed",
        _ => page.cache.as_str(),
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(HTML)),
            (
                header::HeaderName::from_static(X_CACHE),
                HeaderValue::from_static(cache_header),
            ),
        ],
        page.html,
    )
        .into_response()
}

/// Plain-text error body carrying the error message verbatim.
fn error_response(err: &ExplorerError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, TEXT)], err.to_string()).into_response()
}
