//! chainconf CLI library
//!
//! This module exposes the CLI entry point so other binaries can embed
//! the `chainconf` command set.

mod cli;

pub use cli::run;
