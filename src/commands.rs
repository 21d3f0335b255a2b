//! Command dispatch
//!
//! Session commands touch only the persisted store; screen commands build a
//! loader context from configuration and run one screen.

use std::path::Path;

use clap::Subcommand;

use rxdesk_app::config::{init_config_dir, load_settings, TomlSettingsStore};
use rxdesk_app::{FallbackRegistry, Filter, LoaderContext, ResourceRequest, SessionContext};
use rxdesk_client::{HttpTransport, Transport};
use rxdesk_core::prelude::*;
use rxdesk_core::{Appointment, Hospital, Order, Prescription, Product};

use crate::events::{EventSink, ScreenEvent, StdoutSink};
use crate::screens::{departments_screen, list_screen, ScreenOutcome};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a default .rxdesk/config.toml
    Init,

    /// Record a session obtained from the login endpoint
    Login {
        #[arg(long)]
        token: String,

        #[arg(long)]
        user_id: i64,
    },

    /// Forget the stored session
    Logout,

    #[command(flatten)]
    Screen(ScreenCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ScreenCommand {
    /// List hospitals
    Hospitals,

    /// List a hospital's departments, or one department's doctors
    Departments {
        #[arg(long)]
        hospital: i64,

        /// Drill into this department's doctors
        #[arg(long)]
        department: Option<i64>,
    },

    /// List your orders
    Orders {
        /// Only show orders in this status (e.g. 待发货)
        #[arg(long)]
        status: Option<String>,
    },

    /// List your appointments
    Appointments {
        /// Only show appointments in this status (e.g. 已确认)
        #[arg(long)]
        status: Option<String>,
    },

    /// List your prescriptions
    Prescriptions,

    /// Browse the product catalogue
    Products {
        #[arg(long)]
        search: Option<String>,
    },
}

/// Run `command` against the project directory `project_path`
pub async fn run(project_path: &Path, command: Command) -> Result<ScreenOutcome> {
    let settings = load_settings(project_path);
    let session = SessionContext::restore(TomlSettingsStore::open(project_path));
    let mut sink = StdoutSink;

    match command {
        Command::Init => {
            init_config_dir(project_path)?;
            info!("Initialized config in {}", project_path.display());
            Ok(ScreenOutcome::Done)
        }
        Command::Login { token, user_id } => {
            session.establish(token, user_id)?;
            sink.emit(ScreenEvent::session(true, Some(user_id)));
            Ok(ScreenOutcome::Done)
        }
        Command::Logout => {
            session.invalidate();
            sink.emit(ScreenEvent::session(false, None));
            Ok(ScreenOutcome::Done)
        }
        Command::Screen(screen) => {
            let transport = HttpTransport::new(
                &settings.api.base_url,
                settings.api.connect_timeout(),
                settings.api.request_timeout(),
            )?;
            info!("Backend: {}", transport.base_url());
            let ctx = LoaderContext::new(
                session,
                transport,
                FallbackRegistry::from_settings(&settings.fallback),
            );
            Ok(run_screen(&ctx, settings.api.page_size, screen, &mut sink).await)
        }
    }
}

/// Run one screen with an already-built loader context
pub async fn run_screen<X>(
    ctx: &LoaderContext<X>,
    page_size: u32,
    screen: ScreenCommand,
    sink: &mut impl EventSink,
) -> ScreenOutcome
where
    X: Transport + Send + Sync + 'static,
{
    // An invalid session yields id 0; the loader rejects it before any call.
    let user_id = ctx.session.user_id().unwrap_or_default();

    match screen {
        ScreenCommand::Hospitals => {
            list_screen::<Hospital, _>(ctx, ResourceRequest::hospitals(), Filter::all(), sink).await
        }
        ScreenCommand::Departments {
            hospital,
            department,
        } => departments_screen(ctx, hospital, department, sink).await,
        ScreenCommand::Orders { status } => {
            list_screen::<Order, _>(
                ctx,
                ResourceRequest::orders(user_id, page_size, None),
                Filter::status(status.unwrap_or_default()),
                sink,
            )
            .await
        }
        ScreenCommand::Appointments { status } => {
            list_screen::<Appointment, _>(
                ctx,
                ResourceRequest::appointments(user_id, page_size),
                Filter::status(status.unwrap_or_default()),
                sink,
            )
            .await
        }
        ScreenCommand::Prescriptions => {
            list_screen::<Prescription, _>(
                ctx,
                ResourceRequest::prescriptions(user_id),
                Filter::all(),
                sink,
            )
            .await
        }
        ScreenCommand::Products { search } => {
            list_screen::<Product, _>(
                ctx,
                ResourceRequest::products(page_size, search.as_deref()),
                Filter::all(),
                sink,
            )
            .await
        }
    }
}
