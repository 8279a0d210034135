use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use knowthyself_core::error::{GatewayError, GatewayErrorKind};
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiError, AppState};

fn files_base(state: &AppState) -> Result<&str, ApiError> {
    state.files_base_url.as_deref().ok_or_else(|| {
        GatewayError::new(
            GatewayErrorKind::Unconfigured,
            "File backend URL is not configured",
        )
        .into()
    })
}

/// Issues a GET against the file backend, relaying non-success statuses.
async fn proxy_get(
    state: &AppState,
    url: &str,
    query: &[(&str, &str)],
) -> Result<reqwest::Response, ApiError> {
    let response = state
        .http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|err| GatewayError::network(format!("File backend request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = GatewayError::http_status(status.as_u16(), &body);
        return Err(ApiError::passthrough(status.as_u16(), err.message));
    }

    Ok(response)
}

/// Streams the upstream body through, carrying its content type and
/// disabling caches so refreshed result files are never served stale.
fn relay_body(upstream: reqwest::Response, default_content_type: &'static str) -> Response {
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(default_content_type));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));

    (headers, Body::from_stream(upstream.bytes_stream())).into_response()
}

fn is_file_listing(body: &Value) -> bool {
    body.get("files")
        .and_then(Value::as_array)
        .is_some_and(|files| files.iter().all(Value::is_string))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    folder: Option<String>,
}

/// Lists files in a backend folder, validating the `{"files": [..]}` shape.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(folder) = params.folder.filter(|folder| !folder.trim().is_empty()) else {
        return Err(GatewayError::invalid_request("folder is required").into());
    };

    let base = files_base(&state)?.to_string();
    let response = proxy_get(
        &state,
        &format!("{base}/api/files/list"),
        &[("folder", folder.as_str())],
    )
    .await?;

    let body: Value = response.json().await.map_err(|err| {
        GatewayError::parse(format!("Failed to parse file listing: {err}"))
    })?;
    if !is_file_listing(&body) {
        return Err(GatewayError::parse("Unexpected data format from file backend").into());
    }

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct ContentParams {
    folder: Option<String>,
    filename: Option<String>,
}

/// Proxies a raw file body from the backend.
pub async fn content(
    State(state): State<AppState>,
    Query(params): Query<ContentParams>,
) -> Result<Response, ApiError> {
    let Some(folder) = params.folder.filter(|folder| !folder.trim().is_empty()) else {
        return Err(GatewayError::invalid_request("folder is required").into());
    };
    let Some(filename) = params.filename.filter(|name| !name.trim().is_empty()) else {
        return Err(GatewayError::invalid_request("filename is required").into());
    };

    let base = files_base(&state)?.to_string();
    let upstream = proxy_get(
        &state,
        &format!("{base}/api/files/content"),
        &[("folder", folder.as_str()), ("filename", filename.as_str())],
    )
    .await?;

    Ok(relay_body(upstream, "application/octet-stream"))
}

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    filename: Option<String>,
}

/// Serves a generated HTML result file. Anything that is not `.html` or
/// `.htm` is refused with 415 before touching the backend.
pub async fn results(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> Result<Response, ApiError> {
    let Some(filename) = params.filename.filter(|name| !name.trim().is_empty()) else {
        return Err(GatewayError::invalid_request("filename is required").into());
    };

    let lower = filename.to_ascii_lowercase();
    if !lower.ends_with(".html") && !lower.ends_with(".htm") {
        return Err(GatewayError::new(
            GatewayErrorKind::UnsupportedMedia,
            "Only HTML result files can be served",
        )
        .into());
    }

    let base = files_base(&state)?.to_string();
    let upstream = proxy_get(
        &state,
        &format!("{base}/api/files/results"),
        &[("filename", filename.as_str())],
    )
    .await?;

    Ok(relay_body(upstream, "text/html; charset=utf-8"))
}
