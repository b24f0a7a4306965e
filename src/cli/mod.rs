//! # CLI Module
//!
//! Command-line interface of the `triechain` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the demo application:
//!
//! ```bash
//! triechain serve --config triechain.yaml --addr 0.0.0.0:8080
//! ```
//!
//! ### `routes`
//!
//! Print every route of the demo application, grouped by method:
//!
//! ```bash
//! triechain routes
//! ```
//!
//! The configuration file is optional everywhere; see [`crate::config`] for
//! its format and the environment overrides.

mod commands;
mod demo;


pub use commands::{run_cli, Cli, Commands};
pub use demo::demo_engine;
