//! Fixed-interval HTTP health polling for deployed services.
//!
//! A round checks the services in order and stops at the first one that is
//! not healthy, so services after it are not contacted in that round.

use std::time::Duration;

use clara_common::error::{ClaraError, Result};
use clara_common::types::ServiceDescriptor;
use reqwest::StatusCode;

/// Answers whether a single URL is healthy right now.
pub trait HealthCheck {
    /// Returns true only for an HTTP 200 response.
    fn is_healthy(&self, url: &str) -> bool;
}

/// Pauses between rounds.
pub trait Sleeper {
    /// Blocks for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] that blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// [`HealthCheck`] issuing blocking GET requests.
#[derive(Debug, Clone)]
pub struct HttpHealthCheck {
    client: reqwest::blocking::Client,
}

impl HttpHealthCheck {
    /// Creates a checker whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClaraError::Config` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ClaraError::Config {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl HealthCheck for HttpHealthCheck {
    fn is_healthy(&self, url: &str) -> bool {
        match self.client.get(url).send() {
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "health response");
                response.status() == StatusCode::OK
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "health request failed");
                false
            }
        }
    }
}

/// How polling ended. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Every service answered 200 in the same round.
    Healthy {
        /// Round in which that happened, starting at 1.
        rounds: u32,
    },
    /// The attempt budget ran out.
    TimedOut {
        /// Rounds performed.
        rounds: u32,
    },
}

impl HealthOutcome {
    /// Whether all services became healthy.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}

/// Polls a fixed set of services until healthy or out of attempts.
#[derive(Debug, Clone)]
pub struct HealthPoller {
    host: String,
    max_attempts: u32,
    interval: Duration,
}

impl HealthPoller {
    /// Creates a poller checking `host` for up to `max_attempts` rounds.
    #[must_use]
    pub fn new(host: impl Into<String>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            host: host.into(),
            max_attempts,
            interval,
        }
    }

    /// Runs rounds until one passes or the budget is spent.
    ///
    /// `on_retry(attempt, max_attempts)` is called after each failed round,
    /// before the pause. There is no pause after the last round.
    pub fn wait_healthy(
        &self,
        services: &[&ServiceDescriptor],
        check: &dyn HealthCheck,
        sleeper: &dyn Sleeper,
        mut on_retry: impl FnMut(u32, u32),
    ) -> HealthOutcome {
        for attempt in 1..=self.max_attempts {
            if self.round_passes(services, check) {
                tracing::info!(rounds = attempt, "all services healthy");
                return HealthOutcome::Healthy { rounds: attempt };
            }
            on_retry(attempt, self.max_attempts);
            if attempt < self.max_attempts {
                sleeper.sleep(self.interval);
            }
        }
        tracing::warn!(rounds = self.max_attempts, "health polling timed out");
        HealthOutcome::TimedOut {
            rounds: self.max_attempts,
        }
    }

    fn round_passes(&self, services: &[&ServiceDescriptor], check: &dyn HealthCheck) -> bool {
        services
            .iter()
            .all(|svc| check.is_healthy(&svc.health_url(&self.host)))
    }
}
