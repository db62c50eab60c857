//! # clara-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the Clara installer workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and performs no I/O beyond reading a configuration file.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;
