//! Scripted in-memory transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::fetch::errors::FetchError;
use crate::fetch::traits::{RelayRequest, Transport};

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<Value, FetchError>,
    delay: Option<Duration>,
}

/// Responds to requests by their [`RelayRequest::route`].
///
/// Unscripted routes answer `Upstream { status: 404 }`. Delays use tokio time,
/// so paused-clock tests control when responses land.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    scripted: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<RelayRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond_json(&self, route: impl Into<String>, body: Value) {
        self.script(route, Ok(body), None);
    }

    pub(crate) fn respond_json_after(&self, route: impl Into<String>, body: Value, delay: Duration) {
        self.script(route, Ok(body), Some(delay));
    }

    pub(crate) fn respond_error(&self, route: impl Into<String>, error: FetchError) {
        self.script(route, Err(error), None);
    }

    pub(crate) fn respond_error_after(&self, route: impl Into<String>, error: FetchError, delay: Duration) {
        self.script(route, Err(error), Some(delay));
    }

    fn script(&self, route: impl Into<String>, result: Result<Value, FetchError>, delay: Option<Duration>) {
        self.scripted
            .lock()
            .unwrap()
            .insert(route.into(), Scripted { result, delay });
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<RelayRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose route starts with `prefix`.
    pub(crate) fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.route().starts_with(prefix))
            .count()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: RelayRequest, cancel: CancellationToken) -> Result<Value, FetchError> {
        let route = request.route();
        self.calls.lock().unwrap().push(request);
        let scripted = self.scripted.lock().unwrap().get(&route).cloned();

        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let Some(scripted) = scripted else {
            return Err(FetchError::Upstream {
                status: 404,
                message: format!("no scripted response for {}", route),
            });
        };

        if let Some(delay) = scripted.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        scripted.result
    }
}

pub(crate) fn pr_json(status: &str, number: u64) -> Value {
    json!({
        "status": status,
        "title": format!("PR {}", number),
        "number": number,
        "updatedAt": "2026-03-01T10:00:00Z",
        "draft": false,
    })
}

pub(crate) fn agent_json(id: &str, status: &str, pr_url: Option<&str>) -> Value {
    let mut target = json!({
        "branchName": format!("cursor/{}", id),
        "url": format!("https://cursor.com/agents?id={}", id),
    });
    if let Some(pr_url) = pr_url {
        target["prUrl"] = json!(pr_url);
    }
    json!({
        "id": id,
        "name": format!("Agent {}", id),
        "status": status,
        "source": {"repository": "github.com/acme/app"},
        "target": target,
        "createdAt": "2026-03-01T09:00:00Z",
    })
}

pub(crate) fn pr_url(n: usize) -> String {
    format!("https://github.com/acme/app/pull/{}", n)
}

pub(crate) fn status_route(pr_url: &str) -> String {
    format!("GET /api/pr-status?url={}", pr_url)
}

pub(crate) fn comments_route(pr_url: &str) -> String {
    format!("GET /api/pr-comments?url={}", pr_url)
}
