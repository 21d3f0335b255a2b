//! rxdesk Library
//!
//! Command-line front end for the pharmacy and clinic backend: each command
//! is a thin screen that loads one resource and reports its states as NDJSON.

pub mod commands;
pub mod events;
pub mod screens;

pub use commands::{run, run_screen, Command, ScreenCommand};
pub use screens::ScreenOutcome;
