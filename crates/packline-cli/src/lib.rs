//! Packline CLI library.
//!
//! The binary in `main.rs` is a thin wrapper; everything lives here so
//! integration tests can exercise the same code paths.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod emit;
pub mod error;
pub mod logger;
pub mod ui;
