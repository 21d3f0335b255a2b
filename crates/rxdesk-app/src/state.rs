//! Loader state
//!
//! Exactly one [`ResourceState`] is live per loader. `Idle` and `Loading` are
//! transient; `Content`, `Empty` and `Error` are the terminal states of a
//! load cycle.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Reason attached to a well-formed but empty collection
pub const NO_ITEMS: &str = "no items";

/// Message used when the session is not valid
pub const REAUTH_MESSAGE: &str = "session expired, please log in again";

/// Why a load cycle ended in `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No valid session, or the backend answered 401
    Unauthenticated,
    /// The backend answered, but with a failure or a malformed payload
    ApplicationError,
    /// No response at all and no fallback registered
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::ApplicationError => "application error",
            ErrorKind::Network => "network",
        };
        f.write_str(s)
    }
}

/// Where resolved content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Remote,
    /// Synthetic data substituted after a transport failure
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    Idle,
    Loading,
    Content {
        items: Vec<T>,
        fetched_at: DateTime<Local>,
        source: ContentSource,
    },
    Empty {
        reason: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        ResourceState::Idle
    }
}

impl<T> ResourceState<T> {
    pub fn content(items: Vec<T>, source: ContentSource) -> Self {
        ResourceState::Content {
            items,
            fetched_at: Local::now(),
            source,
        }
    }

    pub fn empty(reason: impl Into<String>) -> Self {
        ResourceState::Empty {
            reason: reason.into(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ResourceState::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::error(ErrorKind::Unauthenticated, REAUTH_MESSAGE)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ResourceState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Loading)
    }

    /// `Content`, `Empty` or `Error`
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ResourceState::Idle | ResourceState::Loading)
    }

    pub fn items(&self) -> Option<&[T]> {
        match self {
            ResourceState::Content { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<ContentSource> {
        match self {
            ResourceState::Content { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ResourceState::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in logs and events
    pub fn label(&self) -> &'static str {
        match self {
            ResourceState::Idle => "idle",
            ResourceState::Loading => "loading",
            ResourceState::Content { .. } => "content",
            ResourceState::Empty { .. } => "empty",
            ResourceState::Error { .. } => "error",
        }
    }
}
