//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Providing sensible defaults when the file does not exist yet (first run).
//! - Validating raw values into the settings the frame loop consumes.

pub mod config;
