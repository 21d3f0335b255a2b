//! # rxdesk-app - Session and Resource Loading
//!
//! The state machines behind every list screen: session validity, the
//! generic resource loader, fallback data, local filtering and master/detail
//! drill-down. Rendering is left to the caller, which observes loader states.
//!
//! Depends on [`rxdesk_core`] for domain types and [`rxdesk_client`] for the
//! transport capability.
//!
//! ## Public API
//!
//! ### Session (`session`)
//! - [`SessionContext`] - Shared token/user-id handle; `is_valid`, `establish`, `invalidate`
//!
//! ### Loading (`loader`, `state`, `request`)
//! - [`ResourceLoader`] - `load`, `refresh`, `cancel`, `settle`, `poll_completions`, `subscribe`
//! - [`LoaderContext`] - Session, transport and fallbacks shared by loaders
//! - [`ResourceState`] - `Idle | Loading | Content | Empty | Error`
//! - [`ResourceRequest`] - What to fetch and, for details, which selection it belongs to
//!
//! ### Fallbacks (`fallback`)
//! - [`FallbackRegistry`] - Per-kind substitute data for transport failures
//!
//! ### Filtering (`filter`)
//! - [`Filter`], [`FilterProjector`], [`project()`]
//!
//! ### Drill-down (`drill_down`)
//! - [`DrillDownCoordinator`] - Master list plus detail scoped to the selection
//!
//! ### Configuration (`config`)
//! - [`config::load_settings()`] - `.rxdesk/config.toml` with env override
//! - [`config::TomlSettingsStore`] - Persisted session keys

pub mod config;
pub mod drill_down;
pub mod fallback;
pub mod filter;
pub mod loader;
pub mod request;
pub mod session;
pub mod state;

pub use config::{Settings, SettingsStore};
pub use drill_down::{DrillDownCoordinator, DrillDownView};
pub use fallback::{FallbackRegistry, FallbackSupplier};
pub use filter::{project, Filter, FilterProjector};
pub use loader::{LoaderContext, ResourceLoader};
pub use request::{ParentSelection, ResourceRequest};
pub use session::{Credentials, SessionContext};
pub use state::{ContentSource, ErrorKind, ResourceState};
