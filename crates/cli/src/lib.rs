//! CLI tool for inspecting file-to-node placement.
//!
//! Provides commands for:
//! - Locating the replicas of a file block or placement group
//! - Dumping the full placement map and per-node load
//! - Failing and recovering nodes in a topology file
//! - Converting topology files between JSON and binary

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
