//! Everything the installer does to the outside world.
//!
//! Child processes go through a [`process::CommandRunner`] and HTTP checks
//! through a [`health::HealthCheck`], so the probing, deployment, and polling
//! logic can be exercised without Docker or a network.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod deploy;
pub mod health;
pub mod probe;
pub mod process;
