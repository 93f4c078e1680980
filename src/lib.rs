// ABOUTME: Library root for hoppla-deployer - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod actions;
pub mod archive;
pub mod bundle;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod http;
pub mod logging;
pub mod report;
pub mod types;
