//! # rxdesk-client - Backend Transport
//!
//! Everything needed to turn a resource request into backend traffic and back:
//! the transport capability, its reqwest implementation, the endpoint catalogue
//! and response envelope decoding.
//!
//! Depends on [`rxdesk_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Transport (`transport`)
//! - [`Transport`] - Async remote-call capability (`Send` futures)
//! - [`Endpoint`] - Path plus query parameters, relative to the base URL
//! - [`HttpResponse`] - Status code plus optional JSON body
//! - [`TransportError`] - No response obtained (connect failure, timeout)
//!
//! ### HTTP (`http`)
//! - [`HttpTransport`] - reqwest client with configured timeouts
//!
//! ### Decoding (`envelope`, `endpoints`)
//! - [`decode_collection()`] - Extract a typed collection from a body
//! - [`collection_shape()`] - Where each resource kind keeps its items
//!
//! ### Test Helpers (feature `test-helpers`)
//! - `test_utils::ScriptedTransport` - Scripted transport double

pub mod endpoints;
pub mod envelope;
pub mod http;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod transport;

pub use endpoints::collection_shape;
pub use envelope::{decode_collection, error_message, CollectionShape, DecodeError, Payload};
pub use http::HttpTransport;
pub use transport::{Endpoint, HttpResponse, Transport, TransportError, STATUS_UNAUTHORIZED};
