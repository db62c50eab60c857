//! Domain primitive types used across the Clara installer workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key of a deployable service, as known to the compose file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a new service ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deployable service and how to reach it once running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Compose service name.
    pub id: ServiceId,
    /// Human-readable name.
    pub name: String,
    /// One-line description shown in the selection menu.
    pub description: String,
    /// Host port the service listens on.
    pub port: u16,
    /// URL path answering 200 once the service is ready.
    pub health_path: String,
}

impl ServiceDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        port: u16,
        health_path: impl Into<String>,
    ) -> Self {
        Self {
            id: ServiceId::new(id),
            name: name.into(),
            description: description.into(),
            port,
            health_path: health_path.into(),
        }
    }

    /// Health-check URL for the service on `host`.
    #[must_use]
    pub fn health_url(&self, host: &str) -> String {
        format!("http://{host}:{}{}", self.port, self.health_path)
    }

    /// Base URL an operator opens in a browser.
    #[must_use]
    pub fn access_url(&self, host: &str) -> String {
        format!("http://{host}:{}", self.port)
    }
}

/// What the environment probe found on this host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// The container runtime is installed and its daemon answers.
    pub runtime_available: bool,
    /// A GPU accelerator was detected.
    pub accelerator_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_url_joins_port_and_path() {
        let svc = ServiceDescriptor::new("api", "API", "desc", 5001, "/health");
        assert_eq!(svc.health_url("localhost"), "http://localhost:5001/health");
    }

    #[test]
    fn health_url_with_root_path() {
        let svc = ServiceDescriptor::new("ui", "UI", "desc", 8188, "/");
        assert_eq!(svc.health_url("localhost"), "http://localhost:8188/");
    }

    #[test]
    fn access_url_has_no_path() {
        let svc = ServiceDescriptor::new("api", "API", "desc", 5001, "/health");
        assert_eq!(svc.access_url("10.0.0.4"), "http://10.0.0.4:5001");
    }

    #[test]
    fn service_id_displays_inner_value() {
        assert_eq!(ServiceId::new("clara_n8n").to_string(), "clara_n8n");
    }
}
