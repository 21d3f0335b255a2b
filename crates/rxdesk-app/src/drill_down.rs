//! Master/detail navigation
//!
//! A [`DrillDownCoordinator`] pairs a master loader (e.g. the departments of
//! a hospital) with a detail loader scoped to the selected master item (the
//! doctors of one department). Selecting an item discards the previous detail
//! immediately, so the detail region never shows another item's content.

use std::fmt;

use rxdesk_client::Transport;
use rxdesk_core::prelude::*;
use rxdesk_core::Resource;

use crate::loader::{LoaderContext, ResourceLoader};
use crate::request::ResourceRequest;
use crate::state::ResourceState;

/// Which region is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrillDownView {
    #[default]
    ShowingMaster,
    ShowingDetail,
}

/// Builds the detail request from the master request (the top-level scope)
/// and the selected item
pub type DetailRequestFn<M> = dyn Fn(&ResourceRequest, &M) -> ResourceRequest + Send + Sync;

pub struct DrillDownCoordinator<M: Resource, D: Resource, X> {
    master: ResourceLoader<M, X>,
    detail: ResourceLoader<D, X>,
    selection: Option<M>,
    view: DrillDownView,
    detail_request: Box<DetailRequestFn<M>>,
}

impl<M, D, X> DrillDownCoordinator<M, D, X>
where
    M: Resource,
    D: Resource,
    X: Transport + Send + Sync + 'static,
{
    pub fn new(
        ctx: &LoaderContext<X>,
        detail_request: impl Fn(&ResourceRequest, &M) -> ResourceRequest + Send + Sync + 'static,
    ) -> Self {
        Self {
            master: ctx.loader(),
            detail: ctx.loader(),
            selection: None,
            view: DrillDownView::ShowingMaster,
            detail_request: Box::new(detail_request),
        }
    }

    pub fn master(&self) -> &ResourceLoader<M, X> {
        &self.master
    }

    pub fn detail(&self) -> &ResourceLoader<D, X> {
        &self.detail
    }

    pub fn master_state(&self) -> &ResourceState<M> {
        self.master.state()
    }

    pub fn detail_state(&self) -> &ResourceState<D> {
        self.detail.state()
    }

    pub fn selection(&self) -> Option<&M> {
        self.selection.as_ref()
    }

    pub fn view(&self) -> DrillDownView {
        self.view
    }

    /// Load the master collection, dropping any selection and detail
    pub fn load_master(&mut self, request: ResourceRequest) {
        self.clear_selection();
        self.master.load(request);
    }

    /// Select `item` and start loading its detail.
    ///
    /// The detail loader is reset before the new load is issued, so its state
    /// is `Loading` (or `Error(Unauthenticated)`) by the time this returns.
    /// Ignored until a master request has been loaded.
    pub fn select_master(&mut self, item: M) {
        let Some(scope) = self.master.request() else {
            warn!("Selection ignored: no master collection loaded");
            return;
        };
        let request = (self.detail_request)(scope, &item);
        debug!("Drilling into {} {}", M::KIND, item.id());

        self.detail.reset();
        self.selection = Some(item);
        self.view = DrillDownView::ShowingDetail;
        self.detail.load(request);
    }

    /// Return to the master region, discarding the detail state
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.view = DrillDownView::ShowingMaster;
        self.detail.reset();
    }

    /// Back navigation. Returns false when already showing the master, so
    /// the caller can leave the screen.
    pub fn back(&mut self) -> bool {
        match self.view {
            DrillDownView::ShowingDetail => {
                self.clear_selection();
                true
            }
            DrillDownView::ShowingMaster => false,
        }
    }

    /// Re-fetch whichever region is visible
    pub fn refresh(&mut self) {
        match self.view {
            DrillDownView::ShowingMaster => self.master.refresh(),
            DrillDownView::ShowingDetail => self.detail.refresh(),
        }
    }

    /// Re-fetch the master collection without leaving the detail region.
    ///
    /// Once the refreshed master resolves, a selection it no longer lists is
    /// dropped and the view returns to the master.
    pub fn refresh_master(&mut self) {
        self.master.refresh();
    }

    pub async fn settle_master(&mut self) -> &ResourceState<M> {
        self.master.settle().await;
        self.reconcile_selection();
        self.master.state()
    }

    pub async fn settle_detail(&mut self) -> &ResourceState<D> {
        self.detail.settle().await
    }

    /// Apply already-arrived completions of both loaders
    pub fn poll_completions(&mut self) -> bool {
        let master = self.master.poll_completions();
        if master {
            self.reconcile_selection();
        }
        let detail = self.detail.poll_completions();
        master || detail
    }

    /// Drop a selection that the resolved master no longer contains
    fn reconcile_selection(&mut self) {
        let Some(selected) = self.selection.as_ref().map(Resource::id) else {
            return;
        };
        let present = match self.master.state() {
            ResourceState::Content { items, .. } => items.iter().any(|m| m.id() == selected),
            ResourceState::Empty { .. } => false,
            _ => return,
        };
        if !present {
            debug!("{} {} no longer listed, leaving detail", M::KIND, selected);
            self.clear_selection();
        }
    }
}

impl<M: Resource, D: Resource, X> fmt::Debug for DrillDownCoordinator<M, D, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrillDownCoordinator")
            .field("view", &self.view)
            .field("selection", &self.selection.as_ref().map(Resource::id))
            .finish()
    }
}
