//! Test utilities for transport consumers
//!
//! [`ScriptedTransport`] answers calls from per-path scripts and records every
//! call it receives, so tests can assert both the resulting state and the
//! exact transport traffic (including "no call was made").

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{json, Value};

use crate::transport::{Endpoint, HttpResponse, Transport, TransportError};

/// One scripted outcome for a path
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Wait (on the tokio clock) before producing `outcome`
    Delayed {
        after: Duration,
        outcome: Box<Scripted>,
    },
}

impl Scripted {
    pub fn delayed(after: Duration, outcome: Scripted) -> Self {
        Scripted::Delayed {
            after,
            outcome: Box::new(outcome),
        }
    }
}

/// A call observed by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub auth_token: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, VecDeque<Scripted>>,
    calls: Vec<RecordedCall>,
}

/// Transport double answering from scripts keyed by endpoint path.
///
/// Scripts for a path are consumed in order; the last remaining entry repeats
/// so a single `respond` covers any number of refreshes. Calls to unscripted
/// paths fail with a connect error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for `path`
    pub fn script(&self, path: impl Into<String>, outcome: Scripted) -> &Self {
        self.lock()
            .routes
            .entry(path.into())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn respond(&self, path: impl Into<String>, response: HttpResponse) -> &Self {
        self.script(path, Scripted::Respond(response))
    }

    pub fn fail(&self, path: impl Into<String>, error: TransportError) -> &Self {
        self.script(path, Scripted::Fail(error))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls made to `path`
    pub fn calls_to(&self, path: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.endpoint.path() == path)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_outcome(&self, endpoint: &Endpoint, auth_token: Option<&str>) -> Option<Scripted> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall {
            endpoint: endpoint.clone(),
            auth_token: auth_token.map(str::to_string),
        });
        let queue = inner.routes.get_mut(endpoint.path())?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for ScriptedTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        auth_token: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        // The lock is released before sleeping so concurrent calls don't serialize.
        let mut outcome = match self.next_outcome(endpoint, auth_token) {
            Some(outcome) => outcome,
            None => {
                return Err(TransportError::Connect(format!(
                    "no script for {}",
                    endpoint.path()
                )))
            }
        };

        loop {
            match outcome {
                Scripted::Respond(response) => return Ok(response),
                Scripted::Fail(error) => return Err(error),
                Scripted::Delayed { after, outcome: next } => {
                    tokio::time::sleep(after).await;
                    outcome = *next;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Response Builders
// ─────────────────────────────────────────────────────────────────

/// `{"success": true, "message": "ok", "data": data}`
pub fn envelope(data: Value) -> Value {
    json!({"success": true, "message": "ok", "data": data})
}

/// 200 response with `items` under `data.<field>`
pub fn data_field_response(field: &str, items: Value) -> HttpResponse {
    let mut data = serde_json::Map::new();
    data.insert(field.to_string(), items);
    HttpResponse::ok(envelope(Value::Object(data)))
}

/// 200 response with `items` as `data`
pub fn data_response(items: Value) -> HttpResponse {
    HttpResponse::ok(envelope(items))
}

/// 200 response carrying `{"success": false, "message": message}`
pub fn failure_response(message: &str) -> HttpResponse {
    HttpResponse::ok(json!({"success": false, "message": message, "data": null}))
}

pub fn unauthorized_response() -> HttpResponse {
    HttpResponse::new(401, Some(json!({"detail": "Not authenticated"})))
}
