//! Transport capability used by resource loaders
//!
//! The loader never talks to reqwest directly. It calls a [`Transport`]
//! implementation with an [`Endpoint`] and an optional bearer token, and gets
//! back either an [`HttpResponse`] (any status code) or a [`TransportError`]
//! when no response arrived at all.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// HTTP status the backend uses to reject a missing or expired token
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// A backend path plus query parameters, relative to the configured base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present
    pub fn with_optional_query(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Look up a query parameter by key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// A response that reached the client, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body. `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// A 200 response carrying `body`
    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

/// Failure to obtain any response from the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// The remote-call capability.
///
/// Implement and consume [`Transport`], whose futures are `Send` so loaders
/// can run calls on spawned tasks. `LocalTransport` is only the base the
/// `Send` variant is generated from.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Perform a GET against `endpoint`, attaching `auth_token` as a bearer
    /// token when present.
    async fn call(
        &self,
        endpoint: &Endpoint,
        auth_token: Option<&str>,
    ) -> Result<HttpResponse, TransportError>;
}
