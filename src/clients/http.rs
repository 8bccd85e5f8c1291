//! Shared plumbing for the upstream HTTP clients: client construction, URL
//! building and mapping of transport/status/body failures onto [`SyncError`].

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::error;

use crate::error::{Result, SyncError, Upstream};
use crate::logging::log_upstream_call;

/// Longest upstream error body kept in errors and logs
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(
    service: Upstream,
    timeout: Duration,
    default_headers: HeaderMap,
) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(format!("recognizer-bridge/{}", env!("CARGO_PKG_VERSION")))
        .default_headers(default_headers)
        .build()
        .map_err(|e| {
            SyncError::configuration(format!("Failed to create {service} HTTP client: {e}"))
        })
}

pub(crate) fn parse_base_url(service: Upstream, base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| {
        SyncError::configuration(format!("Invalid {service} base URL '{base_url}': {e}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(SyncError::configuration(format!(
            "{service} base URL '{base_url}' cannot carry a path"
        )));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Send a request, mapping transport failures to `UpstreamUnavailable`
pub(crate) async fn send(
    service: Upstream,
    method: &str,
    url: &Url,
    request: RequestBuilder,
) -> Result<Response> {
    let started = Instant::now();
    let result = request.send().await;
    let elapsed = started.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            log_upstream_call(
                service,
                method,
                url.as_str(),
                Some(response.status().as_u16()),
                elapsed,
            );
            Ok(response)
        }
        Err(e) => {
            log_upstream_call(service, method, url.as_str(), None, elapsed);
            error!(service = %service, url = %url, error = %e, "Request to {service} failed");
            Err(SyncError::unavailable(service, e))
        }
    }
}

/// Turn an unexpected status into `UpstreamRejected`, keeping a bounded body
pub(crate) async fn reject(service: Upstream, mut response: Response) -> SyncError {
    let status = response.status();
    let body = match read_capped(&mut response, MAX_ERROR_BODY).await {
        Ok(body) => body,
        Err(_) => "Unknown error".to_string(),
    };

    error!(
        service = %service,
        status = status.as_u16(),
        body = %body,
        "Error during request to {service}"
    );
    SyncError::rejected(service, status.as_u16(), body)
}

/// Read at most `limit` bytes of the body, stopping at the first chunk past it.
/// The result is cut back to a UTF-8 boundary.
async fn read_capped(response: &mut Response, limit: usize) -> reqwest::Result<String> {
    let mut bytes = Vec::new();
    while bytes.len() < limit {
        match response.chunk().await? {
            Some(chunk) => bytes.extend_from_slice(&chunk),
            None => break,
        }
    }
    bytes.truncate(limit);

    Ok(match String::from_utf8(bytes) {
        Ok(body) => body,
        Err(e) => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8_lossy(&bytes).into_owned()
        }
    })
}

/// Require exactly `200 OK`
pub(crate) async fn expect_ok(service: Upstream, response: Response) -> Result<Response> {
    if response.status() == StatusCode::OK {
        Ok(response)
    } else {
        Err(reject(service, response).await)
    }
}

/// Decode a JSON body, mapping read and decode failures to `UpstreamMalformed`
pub(crate) async fn decode_json<T: DeserializeOwned>(
    service: Upstream,
    response: Response,
) -> Result<T> {
    let bytes = response.bytes().await.map_err(|e| {
        error!(service = %service, error = %e, "Couldn't read body from {service}");
        SyncError::malformed(service, format!("failed to read body: {e}"))
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        error!(service = %service, error = %e, "Couldn't decode body from {service}");
        SyncError::malformed(service, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_encoded_segments() {
        let base = parse_base_url(Upstream::Database, "http://db:8080").unwrap();
        let url = endpoint(&base, &["db", "update", "value", "$taliesin recognizer"]);
        assert_eq!(
            url.as_str(),
            "http://db:8080/db/update/value/$taliesin%20recognizer"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = parse_base_url(Upstream::Recognizer, "http://reco:12191/api/").unwrap();
        let url = endpoint(&base, &["laiaDaemon", "recognizeImgs"]);
        assert_eq!(url.as_str(), "http://reco:12191/api/laiaDaemon/recognizeImgs");
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = parse_base_url(Upstream::Database, "db:8080 nope").unwrap_err();
        assert_eq!(err.kind(), "configuration");

        let err = parse_base_url(Upstream::Database, "mailto:ops@example.org").unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    fn response(status: u16, body: impl Into<reqwest::Body>) -> Response {
        axum::http::Response::builder()
            .status(status)
            .body(body.into())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_reject_keeps_bounded_body() {
        let err = reject(Upstream::Database, response(500, "x".repeat(10_000))).await;

        match err {
            SyncError::UpstreamRejected { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capped_read_stops_on_char_boundary() {
        let mut response = response(500, "€".repeat(300));

        let body = read_capped(&mut response, MAX_ERROR_BODY).await.unwrap();

        assert_eq!(body.len(), 510);
        assert!(body.chars().all(|c| c == '€'));
    }

    #[tokio::test]
    async fn test_short_body_is_kept_whole() {
        let err = reject(Upstream::Recognizer, response(400, "bad request")).await;
        assert_eq!(
            err,
            SyncError::rejected(Upstream::Recognizer, 400, "bad request")
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let result: Result<Vec<u32>> =
            decode_json(Upstream::Database, response(200, "{\"not\":\"an array\"}")).await;
        assert_eq!(result.unwrap_err().kind(), "upstream_malformed");
    }
}
