//! Thin screens
//!
//! Each screen wires loaders to an [`EventSink`]: it reports every state the
//! loader reaches and, for lists with a local filter, reports the filtered
//! view of the content. Rendering beyond that is someone else's job.

use rxdesk_app::{
    DrillDownCoordinator, ErrorKind, Filter, FilterProjector, LoaderContext, ResourceLoader,
    ResourceRequest, ResourceState,
};
use rxdesk_client::Transport;
use rxdesk_core::prelude::*;
use rxdesk_core::{Department, Doctor, Resource};

use crate::events::{EventSink, ScreenEvent};

/// How a screen ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    /// The screen reached a displayable state (content, empty or error)
    Done,
    /// The session is gone; the caller has to log in again
    ReauthRequired,
}

impl ScreenOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            ScreenOutcome::Done => 0,
            ScreenOutcome::ReauthRequired => 2,
        }
    }
}

/// Report `state` and return the outcome it implies
fn report<T: Resource>(
    sink: &mut impl EventSink,
    request: &ResourceRequest,
    state: &ResourceState<T>,
    projector: Option<&FilterProjector<T>>,
) -> ScreenOutcome {
    let visible = match (projector, state.items()) {
        (Some(projector), Some(items)) => Some(projector.project(items)),
        _ => None,
    };
    let filter = projector.map(|p| p.filter().key());

    if let Some(event) = ScreenEvent::from_state(request, state, visible.as_deref(), filter) {
        sink.emit(event);
    }

    if state.error_kind() == Some(ErrorKind::Unauthenticated) {
        sink.emit(ScreenEvent::reauth_required(request));
        ScreenOutcome::ReauthRequired
    } else {
        ScreenOutcome::Done
    }
}

/// Load one collection and report its states, filtered by `filter`
pub async fn list_screen<T, X>(
    ctx: &LoaderContext<X>,
    request: ResourceRequest,
    filter: Filter<T>,
    sink: &mut impl EventSink,
) -> ScreenOutcome
where
    T: Resource,
    X: Transport + Send + Sync + 'static,
{
    let mut loader: ResourceLoader<T, X> = ctx.loader();
    let mut projector = FilterProjector::new();
    projector.apply_filter(filter);

    loader.load(request.clone());
    if report(sink, &request, loader.state(), Some(&projector)) == ScreenOutcome::ReauthRequired {
        return ScreenOutcome::ReauthRequired;
    }

    let state = loader.settle().await;
    report(sink, &request, state, Some(&projector))
}

/// Departments of a hospital, optionally drilling into one department's
/// doctors
pub async fn departments_screen<X>(
    ctx: &LoaderContext<X>,
    hospital_id: i64,
    department_id: Option<i64>,
    sink: &mut impl EventSink,
) -> ScreenOutcome
where
    X: Transport + Send + Sync + 'static,
{
    let mut coordinator: DrillDownCoordinator<Department, Doctor, X> =
        DrillDownCoordinator::new(ctx, |scope: &ResourceRequest, department: &Department| {
            let hospital_id = scope.parent.map(|p| p.id).unwrap_or_default();
            ResourceRequest::doctors(hospital_id, department.id)
        });

    let master_request = ResourceRequest::departments(hospital_id);
    coordinator.load_master(master_request.clone());
    if report(sink, &master_request, coordinator.master_state(), None)
        == ScreenOutcome::ReauthRequired
    {
        return ScreenOutcome::ReauthRequired;
    }

    let outcome = report(
        sink,
        &master_request,
        coordinator.settle_master().await,
        None,
    );
    let Some(department_id) = department_id else {
        return outcome;
    };
    if outcome == ScreenOutcome::ReauthRequired {
        return outcome;
    }

    let selected = coordinator
        .master_state()
        .items()
        .and_then(|items| items.iter().find(|d| d.id == department_id))
        .cloned();
    let Some(department) = selected else {
        warn!(
            "Department {} not found in hospital {}",
            department_id, hospital_id
        );
        let request = ResourceRequest::doctors(hospital_id, department_id);
        let state: ResourceState<Doctor> = ResourceState::error(
            ErrorKind::ApplicationError,
            format!("department {department_id} not found in hospital {hospital_id}"),
        );
        return report(sink, &request, &state, None);
    };

    coordinator.select_master(department);
    let Some(detail_request) = coordinator.detail().request().cloned() else {
        return outcome;
    };
    if report(sink, &detail_request, coordinator.detail_state(), None)
        == ScreenOutcome::ReauthRequired
    {
        return ScreenOutcome::ReauthRequired;
    }

    let state = coordinator.settle_detail().await;
    report(sink, &detail_request, state, None)
}
