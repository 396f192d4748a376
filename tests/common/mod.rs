//! Local HTTP fixture server for provider tests
//!
//! The first path segment selects the response, so a provider configured with
//! base URL `http://127.0.0.1:<port>/gzip/` gets gzip bodies for both its
//! search and cache URLs:
//!
//! - `missing` answers 404
//! - `broken` answers 500
//! - `gzip` / `deflate` answer [FEED] with that Content-Encoding
//! - `empty` answers 200 with no body
//! - `slow` answers [FEED] after [SLOW_RESPONSE_DELAY]
//! - anything else answers [FEED] uncompressed

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use parking_lot::Mutex;

/// One complete item and one without an enclosure
pub const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>tv torrents RSS feed - KickassTorrents</title>
    <item>
      <title>Ex.Show.S01E02.HDTV.x264-GRP</title>
      <enclosure url="http://example/ex.torrent?title=x&amp;hash=y" length="1" type="application/x-bittorrent" />
    </item>
    <item>
      <title>Ex.Show.S01E02.720p.HDTV.x264-GRP</title>
    </item>
  </channel>
</rss>"#;

/// Delay of the `slow` mode, far above any client timeout used in tests
pub const SLOW_RESPONSE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path and query as received
    pub uri: String,
    pub accept_encoding: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Default)]
struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct FixtureServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl FixtureServer {
    pub async fn spawn() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new().fallback(serve).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL whose responses follow `mode`
    pub fn base_url(&self, mode: &str) -> String {
        format!("http://{}/{}/", self.addr, mode)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Number of requests whose path starts with `prefix`
    pub fn hits(&self, prefix: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.uri.starts_with(prefix))
            .count()
    }
}

async fn serve(State(state): State<Arc<ServerState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.requests.lock().push(RecordedRequest {
        uri: uri.to_string(),
        accept_encoding: header_value(&headers, header::ACCEPT_ENCODING),
        user_agent: header_value(&headers, header::USER_AGENT),
    });

    let mode = uri.path().trim_start_matches('/').split('/').next().unwrap_or_default();
    match mode {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "empty" => StatusCode::OK.into_response(),
        "slow" => {
            tokio::time::sleep(SLOW_RESPONSE_DELAY).await;
            FEED.into_response()
        }
        "gzip" => (
            [(header::CONTENT_ENCODING, "gzip")],
            gzip(FEED.as_bytes()),
        )
            .into_response(),
        "deflate" => (
            [(header::CONTENT_ENCODING, "deflate")],
            deflate(FEED.as_bytes()),
        )
            .into_response(),
        _ => ([(header::CONTENT_TYPE, "application/rss+xml")], FEED).into_response(),
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}
