//! NDJSON screen events
//!
//! Every loader state a screen reaches is written to stdout as one JSON
//! object per line. Each event has an "event" field naming its type.
//!
//! # Example Output
//!
//! ```json
//! {"event":"loading","resource":"orders of user 4","kind":"orders","timestamp":1704700001000}
//! {"event":"content","resource":"orders of user 4","kind":"orders","source":"fallback","filter":"待发货","count":2,"items":[...],"timestamp":1704700002000}
//! {"event":"reauth_required","resource":"orders of user 4","timestamp":1704700003000}
//! ```

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use rxdesk_app::{ContentSource, ErrorKind, ResourceRequest, ResourceState};
use rxdesk_core::{Resource, ResourceKind};

/// Events emitted by screens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScreenEvent {
    /// A load cycle started
    Loading {
        resource: String,
        kind: ResourceKind,
        timestamp: i64,
    },

    /// Items to display, already filtered
    Content {
        resource: String,
        kind: ResourceKind,
        source: ContentSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        count: usize,
        items: Value,
        timestamp: i64,
    },

    /// The backend returned no items
    Empty {
        resource: String,
        kind: ResourceKind,
        reason: String,
        timestamp: i64,
    },

    /// The load cycle failed
    Error {
        resource: String,
        kind: ResourceKind,
        error: ErrorKind,
        message: String,
        timestamp: i64,
    },

    /// The caller must log in again before anything else can load
    ReauthRequired { resource: String, timestamp: i64 },

    /// Session established or cleared by `login` / `logout`
    Session {
        logged_in: bool,
        user_id: Option<i64>,
        timestamp: i64,
    },
}

impl ScreenEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = self.write_to(&mut stdout) {
            error!("Failed to write screen event to stdout: {}", e);
        }
    }

    /// Write this event as one NDJSON line
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let json = serde_json::to_string(self).map_err(io::Error::other)?;
        writeln!(out, "{}", json)?;
        out.flush()
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    /// The event for a loader state, with `visible` as the displayed items.
    ///
    /// Returns `None` for `Idle`, which screens never report.
    pub fn from_state<T: Resource>(
        request: &ResourceRequest,
        state: &ResourceState<T>,
        visible: Option<&[T]>,
        filter: Option<&str>,
    ) -> Option<Self> {
        let resource = request.key.clone();
        let kind = request.kind;
        let timestamp = Self::now();

        let event = match state {
            ResourceState::Idle => return None,
            ResourceState::Loading => Self::Loading {
                resource,
                kind,
                timestamp,
            },
            ResourceState::Content { items, source, .. } => {
                let visible = visible.unwrap_or(items.as_slice());
                let items = serde_json::to_value(visible).unwrap_or_else(|e| {
                    error!("Failed to serialize {} items: {}", kind, e);
                    Value::Null
                });
                Self::Content {
                    resource,
                    kind,
                    source: *source,
                    filter: filter.filter(|f| !f.is_empty()).map(str::to_string),
                    count: visible.len(),
                    items,
                    timestamp,
                }
            }
            ResourceState::Empty { reason } => Self::Empty {
                resource,
                kind,
                reason: reason.clone(),
                timestamp,
            },
            ResourceState::Error { kind: error, message } => Self::Error {
                resource,
                kind,
                error: *error,
                message: message.clone(),
                timestamp,
            },
        };
        Some(event)
    }

    pub fn reauth_required(request: &ResourceRequest) -> Self {
        Self::ReauthRequired {
            resource: request.key.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn session(logged_in: bool, user_id: Option<i64>) -> Self {
        Self::Session {
            logged_in,
            user_id,
            timestamp: Self::now(),
        }
    }

    /// The `event` tag of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading { .. } => "loading",
            Self::Content { .. } => "content",
            Self::Empty { .. } => "empty",
            Self::Error { .. } => "error",
            Self::ReauthRequired { .. } => "reauth_required",
            Self::Session { .. } => "session",
        }
    }
}

/// Destination for screen events
pub trait EventSink {
    fn emit(&mut self, event: ScreenEvent);
}

/// Writes events to stdout as NDJSON
#[derive(Debug, Default)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&mut self, event: ScreenEvent) {
        event.emit();
    }
}

/// Collects events, used by tests
impl EventSink for Vec<ScreenEvent> {
    fn emit(&mut self, event: ScreenEvent) {
        self.push(event);
    }
}
