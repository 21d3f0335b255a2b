//! reqwest-backed transport
//!
//! Resolves endpoints against the configured base URL, attaches the bearer
//! token and maps reqwest failures onto [`TransportError`]. Timeouts are
//! enforced here, never by the loader.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use rxdesk_core::prelude::*;

use crate::transport::{Endpoint, HttpResponse, Transport, TransportError};

/// HTTP transport talking to the real backend
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `base_url` with the given timeouts.
    ///
    /// A base URL without a trailing slash gets one, so that relative
    /// endpoint paths append instead of replacing the last segment.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| Error::invalid_url(base_url, e.to_string()))?;

        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint to an absolute URL
    pub fn resolve(&self, endpoint: &Endpoint) -> std::result::Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| TransportError::Other(format!("invalid endpoint {endpoint}: {e}")))?;
        if !endpoint.query().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in endpoint.query() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        auth_token: Option<&str>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let url = self.resolve(endpoint)?;
        debug!("GET {}", url);

        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        let body = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Response from {} is not JSON: {}", endpoint, e);
                    None
                }
            }
        };

        debug!("{} -> HTTP {}", endpoint, status);
        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(1), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let t = transport("http://10.0.2.2:8000");
        assert_eq!(t.base_url().as_str(), "http://10.0.2.2:8000/");
    }

    #[test]
    fn test_resolve_appends_path_and_query() {
        let t = transport("http://192.168.0.3:8000/");
        let endpoint = Endpoint::new("api/v1/orders/user/4")
            .with_query("skip", 0)
            .with_query("limit", 100);
        let url = t.resolve(&endpoint).unwrap();
        assert_eq!(
            url.as_str(),
            "http://192.168.0.3:8000/api/v1/orders/user/4?skip=0&limit=100"
        );
    }

    #[test]
    fn test_resolve_keeps_base_path_prefix() {
        let t = transport("https://example.test/backend");
        let url = t
            .resolve(&Endpoint::new("/api/v1/appointments/hospitals"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/backend/api/v1/appointments/hospitals"
        );
    }

    #[test]
    fn test_resolve_encodes_query_values() {
        let t = transport("http://localhost:8000/");
        let endpoint = Endpoint::new("api/v1/products/").with_query("search", "养生 茶");
        let url = t.resolve(&endpoint).unwrap();
        assert!(url.as_str().contains("search=%E5%85%BB%E7%94%9F+%E8%8C%B6"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpTransport::new("not a url", Duration::from_secs(1), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let t = transport("http://127.0.0.1:9/");
        let result = t.call(&Endpoint::new("api/v1/appointments/hospitals"), None).await;
        assert!(result.is_err());
    }
}
