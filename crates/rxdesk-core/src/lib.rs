//! # rxdesk-core - Core Domain Types
//!
//! Foundation crate for rxdesk. Provides the backend's domain records, the
//! shared error type and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`ResourceKind`] - The fetchable collections (hospitals, orders, ...)
//! - [`Resource`] - Trait tying a record type to its kind and backend id
//! - [`HasStatus`] - Records with a workflow status used by status filters
//! - [`Hospital`], [`Department`], [`Doctor`], [`Order`], [`Appointment`],
//!   [`Prescription`], [`Product`]
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum, one section per layer
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use rxdesk_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all rxdesk crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use types::{
    Appointment, Department, Doctor, HasStatus, Hospital, Order, Prescription, Product, Resource,
    ResourceKind,
};
