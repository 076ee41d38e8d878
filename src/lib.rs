//! # scorepipe - bounded producer/consumer matrix scoring
//!
//! A single producer feeds work items into a fixed-capacity blocking queue; a
//! pool of worker threads drains it, scores each item's deterministically
//! generated matrix, and inserts the results above a threshold into a
//! bounded collection that stays sorted by score.
//!
//! ## Modules
//!
//! - [`pipeline`]: the work queues, sorted result monitor and worker pool
//! - [`scoring`]: matrix generation and the scoring strategies
//! - [`driver`]: input loading, sizing policy, run orchestration, reports
//! - [`config`]: layered figment configuration
//! - [`cli`]: the `scorepipe` command-line interface

pub mod cli;
pub mod config;
pub mod driver;
pub mod pipeline;
pub mod scoring;

pub use cli::{Cli, Output};
pub use config::ScorepipeConfig;

/// Result type alias for scorepipe operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
