//! SCF CLI - command-line driver for the configurator
//!
//! - `load`: fetch the catalogs and report counts and failures
//! - `coverage`: filter, select and print framework/risk/threat coverage
//! - `overlap`: compare two frameworks or core levels
//! - `risk-threat`: how well one subject's controls carry risk and threat summaries
//! - `automate`: replay a batch of chat-originated UI actions
//! - `export`: write the project bootstrap document

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commands;
pub mod config;

pub use commands::FilterArgs;
pub use config::AppConfig;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
