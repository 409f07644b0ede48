//! RBAC migration CLI library
//!
//! Configuration loading, logging setup and command handlers behind the
//! `rbac-migrate` binary.

/// Command handlers
pub mod commands;

/// Configuration file loading
pub mod config;

/// Tracing subscriber setup
pub mod logging;
