//! Local HTTP stub for exercising providers without touching the network.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::task::JoinHandle;

use crate::config::HttpConfig;

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn xml(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/xml; charset=utf-8",
            ..Self::html(body)
        }
    }

    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::html("")
        }
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct StubState {
    routes: HashMap<String, StubResponse>,
    requests: Mutex<Vec<String>>,
}

/// HTTP server on `127.0.0.1:<random port>` answering from a path → response table.
/// Unknown paths get 404. Every request's path and query is recorded.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubServer {
    #[must_use]
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests received for `path` (query ignored).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.split('?').next() == Some(path))
            .count()
    }

    /// Every request received so far as `path?query`, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Default)]
pub struct StubServerBuilder {
    routes: HashMap<String, StubResponse>,
}

impl StubServerBuilder {
    #[must_use]
    pub fn route(mut self, path: impl Into<String>, response: StubResponse) -> Self {
        self.routes.insert(path.into(), response);
        self
    }

    /// Bind and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> std::io::Result<StubServer> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(StubState {
            routes: self.routes,
            requests: Mutex::default(),
        });
        let app = Router::new().fallback(respond).with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(StubServer {
            addr,
            state,
            handle,
        })
    }
}

async fn respond(State(state): State<Arc<StubState>>, uri: Uri) -> Response {
    let recorded = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    let Some(stub) = state.routes.get(uri.path()).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    let status = StatusCode::from_u16(stub.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, stub.content_type)], stub.body).into_response()
}

/// HTTP settings with short timeouts so timeout tests finish quickly.
#[must_use]
pub fn fast_http_config() -> HttpConfig {
    HttpConfig {
        connect_timeout_ms: 500,
        read_timeout_ms: 500,
        lyrics_read_timeout_ms: 500,
        ..HttpConfig::default()
    }
}
