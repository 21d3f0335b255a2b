//! Generic resource loader
//!
//! A [`ResourceLoader`] owns one resource slot of a screen. `load` checks the
//! session, moves to `Loading` and spawns the transport call; the owner then
//! applies the completion with [`ResourceLoader::settle`] (await) or
//! [`ResourceLoader::poll_completions`] (tick-driven). All state changes go
//! through `&mut self` and are published on a `watch` channel.
//!
//! **In-flight policy:** one call per loader. A new `load` aborts the previous
//! task and drops its handle, so a superseded completion is never applied.
//!
//! **Refresh display:** `Loading` is always the live state, but the last
//! resolved state is retained and [`ResourceLoader::last_content`] keeps
//! returning the previous items until the new cycle resolves.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use rxdesk_client::{
    collection_shape, decode_collection, error_message, HttpResponse, Payload, Transport,
    TransportError,
};
use rxdesk_core::prelude::*;
use rxdesk_core::Resource;

use crate::fallback::FallbackRegistry;
use crate::request::ResourceRequest;
use crate::session::SessionContext;
use crate::state::{ContentSource, ErrorKind, ResourceState, NO_ITEMS};

type CallOutcome = std::result::Result<HttpResponse, TransportError>;

/// Collaborators shared by every loader of a process
///
/// Cloning is cheap: the session is a shared handle and the transport and
/// fallback registry are reference counted.
pub struct LoaderContext<X> {
    pub session: SessionContext,
    pub transport: Arc<X>,
    pub fallbacks: Arc<FallbackRegistry>,
}

impl<X> Clone for LoaderContext<X> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            transport: Arc::clone(&self.transport),
            fallbacks: Arc::clone(&self.fallbacks),
        }
    }
}

impl<X> LoaderContext<X>
where
    X: Transport + Send + Sync + 'static,
{
    pub fn new(session: SessionContext, transport: X, fallbacks: FallbackRegistry) -> Self {
        Self {
            session,
            transport: Arc::new(transport),
            fallbacks: Arc::new(fallbacks),
        }
    }

    /// Create an idle loader for `T`
    pub fn loader<T: Resource>(&self) -> ResourceLoader<T, X> {
        ResourceLoader::new(self.clone())
    }
}

/// Loading state machine for one collection of `T`
pub struct ResourceLoader<T: Resource, X> {
    ctx: LoaderContext<X>,
    state: ResourceState<T>,
    /// Most recent `Content`/`Empty`/`Error`, kept through later cycles
    last_resolved: ResourceState<T>,
    current: Option<ResourceRequest>,
    in_flight: Option<JoinHandle<CallOutcome>>,
    state_tx: watch::Sender<ResourceState<T>>,
}

impl<T, X> ResourceLoader<T, X>
where
    T: Resource,
    X: Transport + Send + Sync + 'static,
{
    pub fn new(ctx: LoaderContext<X>) -> Self {
        let (state_tx, _) = watch::channel(ResourceState::Idle);
        Self {
            ctx,
            state: ResourceState::Idle,
            last_resolved: ResourceState::Idle,
            current: None,
            in_flight: None,
            state_tx,
        }
    }

    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    /// Items of the most recent `Content`, retained while a refresh is loading
    pub fn last_content(&self) -> Option<&[T]> {
        self.last_resolved.items()
    }

    /// The request of the current (or last) cycle
    pub fn request(&self) -> Option<&ResourceRequest> {
        self.current.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx.session
    }

    /// Observe every state this loader enters
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state_tx.subscribe()
    }

    /// Start a load cycle for `request`, superseding any call in flight.
    ///
    /// Must be called from within a tokio runtime. Without a valid session the
    /// loader goes straight to `Error(Unauthenticated)` and no call is made.
    pub fn load(&mut self, request: ResourceRequest) {
        self.abort_in_flight();
        self.current = Some(request.clone());

        let Some(credentials) = self.ctx.session.credentials() else {
            debug!("Not loading {}: no valid session", request);
            self.set_state(ResourceState::unauthenticated());
            return;
        };

        debug!("Loading {} ({})", request, request.endpoint);
        self.set_state(ResourceState::Loading);

        let transport = Arc::clone(&self.ctx.transport);
        let endpoint = request.endpoint;
        self.in_flight = Some(tokio::spawn(async move {
            transport.call(&endpoint, Some(&credentials.token)).await
        }));
    }

    /// Re-issue the current request. Does nothing before the first `load`.
    pub fn refresh(&mut self) {
        match self.current.clone() {
            Some(request) => self.load(request),
            None => debug!("Refresh ignored: nothing loaded yet"),
        }
    }

    /// Abort the call in flight and return to the last resolved state
    pub fn cancel(&mut self) {
        if self.abort_in_flight() && self.state.is_loading() {
            let previous = self.last_resolved.clone();
            self.set_state(previous);
        }
    }

    /// Abort any call and forget everything, back to `Idle`
    pub fn reset(&mut self) {
        self.abort_in_flight();
        self.current = None;
        self.last_resolved = ResourceState::Idle;
        self.set_state(ResourceState::Idle);
    }

    /// Wait for the call in flight (if any) and apply its outcome
    pub async fn settle(&mut self) -> &ResourceState<T> {
        if let Some(handle) = self.in_flight.as_mut() {
            let joined = handle.await;
            self.in_flight = None;
            self.complete(joined);
        }
        &self.state
    }

    /// Apply a completion that has already arrived, without waiting.
    ///
    /// Returns true when the state changed.
    pub fn poll_completions(&mut self) -> bool {
        let Some(handle) = self.in_flight.as_mut() else {
            return false;
        };
        if !handle.is_finished() {
            return false;
        }
        match handle.now_or_never() {
            Some(joined) => {
                self.in_flight = None;
                self.complete(joined);
                true
            }
            None => false,
        }
    }

    fn abort_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(handle) => {
                handle.abort();
                if let Some(request) = &self.current {
                    debug!("Aborted in-flight load of {}", request);
                }
                true
            }
            None => false,
        }
    }

    fn complete(&mut self, joined: std::result::Result<CallOutcome, JoinError>) {
        let Some(request) = self.current.clone() else {
            return;
        };
        let next = match joined {
            Ok(outcome) => self.resolve(&request, outcome),
            Err(e) => {
                error!("Load task for {} failed: {}", request, e);
                ResourceState::error(ErrorKind::Network, format!("request task failed: {e}"))
            }
        };
        self.set_state(next);
    }

    fn resolve(&self, request: &ResourceRequest, outcome: CallOutcome) -> ResourceState<T> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => return self.resolve_transport_failure(request, e),
        };

        if response.is_unauthorized() {
            warn!("{} rejected with HTTP 401, invalidating session", request);
            self.ctx.session.invalidate();
            return ResourceState::unauthenticated();
        }

        if !response.is_success() {
            let message = error_message(response.status, response.body.as_ref());
            warn!("{} failed: {}", request, message);
            return ResourceState::error(ErrorKind::ApplicationError, message);
        }

        match decode_collection::<T>(response.body.as_ref(), collection_shape(request.kind)) {
            Ok(Payload::Items(items)) if items.is_empty() => {
                debug!("{}: no items", request);
                ResourceState::empty(NO_ITEMS)
            }
            Ok(Payload::Items(items)) => {
                debug!("{}: {} items", request, items.len());
                ResourceState::content(items, ContentSource::Remote)
            }
            Ok(Payload::Failure(message)) => {
                warn!("{} reported failure: {}", request, message);
                ResourceState::error(ErrorKind::ApplicationError, message)
            }
            Err(e) => {
                warn!("{} returned a malformed payload: {}", request, e);
                ResourceState::error(
                    ErrorKind::ApplicationError,
                    format!("malformed response: {e}"),
                )
            }
        }
    }

    fn resolve_transport_failure(
        &self,
        request: &ResourceRequest,
        error: TransportError,
    ) -> ResourceState<T> {
        match self.ctx.fallbacks.supply::<T>(request) {
            Some(items) => {
                warn!("{} failed ({}), showing fallback data", request, error);
                if items.is_empty() {
                    ResourceState::empty(NO_ITEMS)
                } else {
                    ResourceState::content(items, ContentSource::Fallback)
                }
            }
            None => {
                warn!("{} failed: {}", request, error);
                ResourceState::error(ErrorKind::Network, error.to_string())
            }
        }
    }

    fn set_state(&mut self, state: ResourceState<T>) {
        if state.is_resolved() {
            self.last_resolved = state.clone();
        }
        trace!("Loader state -> {}", state.label());
        self.state = state.clone();
        self.state_tx.send_replace(state);
    }
}

impl<T: Resource, X> Drop for ResourceLoader<T, X> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
