//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::domain::ApiClient;
use crate::domain::AccessToken;
use crate::domain::ports::{
    HttpRequest, HttpResponse, HttpTransport, Notifier, Severity, TransportError,
    UnauthorizedHandler,
};
use crate::outbound::storage::MemoryKeyValueStore;

/// Base URL used by [`ClientHarness`].
pub const TEST_BASE_URL: &str = "http://api.test/api";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Transport that replays queued responses and records every request.
///
/// An empty queue answers with a connect failure.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Queue a response.
    pub fn push_response(&self, response: HttpResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: Value) {
        let bytes = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes,
            Err(error) => panic!("serialise scripted body: {error}"),
        };
        self.push_response(HttpResponse::new(status, bytes));
    }

    /// Queue a response with a raw text body.
    pub fn push_raw(&self, status: u16, body: &str) {
        self.push_response(HttpResponse::new(status, body.as_bytes().to_vec()));
    }

    /// Queue an empty-bodied response.
    pub fn push_status(&self, status: u16) {
        self.push_response(HttpResponse::new(status, Vec::new()));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::connect("no scripted response")))
    }
}

/// Unauthorized handler that counts invocations.
#[derive(Debug, Default)]
pub struct RecordingUnauthorizedHandler(AtomicUsize);

impl RecordingUnauthorizedHandler {
    /// Number of times the handler fired.
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl UnauthorizedHandler for RecordingUnauthorizedHandler {
    fn on_unauthorized(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Notifier that keeps every notification.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<RecordedNotification>>);

impl RecordingNotifier {
    /// Notifications shown so far, oldest first.
    pub fn notifications(&self) -> Vec<RecordedNotification> {
        lock(&self.0).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        lock(&self.0).push(RecordedNotification {
            title: title.to_owned(),
            message: message.to_owned(),
            severity,
        });
    }
}

/// Client wired to in-memory doubles.
pub struct ClientHarness {
    pub client: ApiClient,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryKeyValueStore>,
    pub unauthorized: Arc<RecordingUnauthorizedHandler>,
}

impl ClientHarness {
    /// Harness against [`TEST_BASE_URL`] with no stored token.
    pub fn new() -> Self {
        let base_url = match Url::parse(TEST_BASE_URL) {
            Ok(url) => url,
            Err(error) => panic!("parse test base URL: {error}"),
        };
        let transport = Arc::new(ScriptedTransport::default());
        let store = Arc::new(MemoryKeyValueStore::default());
        let unauthorized = Arc::new(RecordingUnauthorizedHandler::default());
        let client = ApiClient::new(
            base_url,
            transport.clone(),
            store.clone(),
            unauthorized.clone(),
        );
        Self {
            client,
            transport,
            store,
            unauthorized,
        }
    }

    /// Store `token` as though a login had succeeded.
    pub fn sign_in(&self, token: &str) {
        let Some(token) = AccessToken::new(token) else {
            panic!("test token must not be blank");
        };
        self.client.set_token(Some(&token));
    }
}

impl Default for ClientHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub mod cap_fs {
    //! Temporary directories for file-store tests.

    use std::io;

    use cap_std::{ambient_authority, fs::Dir};
    use tempfile::TempDir;

    /// Temporary directory plus a capability handle on it.
    ///
    /// The directory is removed when this value is dropped.
    pub struct ScratchDir {
        pub dir: Dir,
        pub path: TempDir,
    }

    /// Create a fresh scratch directory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use client::test_support::cap_fs::scratch_dir;
    ///
    /// let scratch = scratch_dir()?;
    /// scratch.dir.write("marker.txt", b"ok")?;
    /// assert!(scratch.path.path().join("marker.txt").exists());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn scratch_dir() -> io::Result<ScratchDir> {
        let path = tempfile::tempdir()?;
        let dir = Dir::open_ambient_dir(path.path(), ambient_authority())?;
        Ok(ScratchDir { dir, path })
    }
}
