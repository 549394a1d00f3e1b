//! Command implementations for the packline CLI.
//!
//! - [`build`] - Resolve the configuration and emit assets
//! - [`dev`] - Development server with watch mode and live reload
//! - [`check`] - Validate the configuration without building
//!
//! Each command lives in its own module and exposes an `execute` function
//! taking the parsed arguments.

pub mod build;
pub mod check;
pub mod dev;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
