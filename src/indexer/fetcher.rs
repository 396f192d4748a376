//! Tolerant HTTP fetcher for indexer feeds
//!
//! A fetch is a single GET with no retries. Every failure is logged and
//! collapsed into `None`, except a 404 which KAT uses to mean "no results":
//! that becomes an empty RSS document so callers treat both the same way.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use tracing::{debug, error};

/// Feed returned in place of a 404 response
pub const EMPTY_FEED: &str =
    r#"<?xml version="1.0" encoding="utf-8"?><rss version="2.0"><channel></channel></rss>"#;

/// Default identifying user agent
pub const DEFAULT_USER_AGENT: &str = "Librarian/1.0 (KAT indexer)";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_ENCODING: &str = "gzip,deflate";

/// Reasons a fetch produced no data
#[derive(Debug, Error)]
pub enum FetchError {
    /// Remote answered 404; not a failure for indexer feeds
    #[error("not found")]
    NotFound,

    #[error("HTTP error {0}")]
    Status(StatusCode),

    #[error("timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connect(String),

    #[error("request error: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("failed to decode {encoding} body: {source}")]
    Decode {
        encoding: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// HTTP fetcher shared by an indexer's search and cache paths
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the given user agent and request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a URL, returning the decoded body or `None` on any failure.
    ///
    /// A 404 yields [`EMPTY_FEED`]. Extra headers are sent after the fixed
    /// `Accept-Encoding` header.
    pub async fn fetch(&self, url: &str, extra_headers: &[(&str, &str)]) -> Option<Vec<u8>> {
        match self.try_fetch(url, extra_headers).await {
            Ok(body) => Some(body),
            Err(FetchError::NotFound) => {
                debug!(url = %url, "Got 404, treating as an empty feed");
                Some(EMPTY_FEED.as_bytes().to_vec())
            }
            Err(FetchError::Timeout) => {
                error!(url = %url, "Timed out while loading URL");
                None
            }
            Err(FetchError::Status(status)) => {
                error!(
                    url = %url,
                    status = status.as_u16(),
                    "HTTP error {} while loading URL",
                    status.as_u16()
                );
                None
            }
            Err(e) => {
                error!(url = %url, error = %e, "Error while loading URL");
                None
            }
        }
    }

    /// Fetch a URL and surface the failure kind
    pub async fn try_fetch(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT_ENCODING, ACCEPT_ENCODING);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let encoding = response
            .headers()
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase());

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;

        decode_body(encoding.as_deref(), &body)
    }
}

/// Decode a response body according to its Content-Encoding
pub fn decode_body(encoding: Option<&str>, body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut decoded = Vec::new();

    let result = match encoding {
        Some("gzip") | Some("x-gzip") => GzDecoder::new(body).read_to_end(&mut decoded),
        Some("deflate") => ZlibDecoder::new(body).read_to_end(&mut decoded),
        _ => return Ok(body.to_vec()),
    };

    result.map_err(|source| FetchError::Decode {
        encoding: encoding.unwrap_or_default().to_string(),
        source,
    })?;

    Ok(decoded)
}
