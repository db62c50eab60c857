//! Host environment detection: container runtime and GPU accelerator.

use clara_common::config::InstallerConfig;

use crate::process::CommandRunner;

/// Result of probing the container runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// Both the version check and the daemon check succeeded.
    Available {
        /// Output of the version check.
        version: String,
    },
    /// The version check failed: the binary is missing or broken.
    NotInstalled,
    /// The binary works but the daemon did not answer.
    DaemonNotRunning,
}

impl RuntimeStatus {
    /// Whether deployment can proceed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Runs the environment checks through a [`CommandRunner`].
pub struct EnvironmentProber<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a InstallerConfig,
}

impl<'a> EnvironmentProber<'a> {
    /// Creates a prober.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, config: &'a InstallerConfig) -> Self {
        Self { runner, config }
    }

    /// Checks that the runtime is installed and its daemon is reachable.
    ///
    /// The daemon check only runs once the version check passed.
    pub fn probe_runtime(&self) -> RuntimeStatus {
        let binary = self.config.runtime_binary.as_str();
        let timeout = self.config.quick_timeout();

        let version = match self.runner.capture(binary, &["--version"], timeout) {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(error = %e, "container runtime version check failed");
                return RuntimeStatus::NotInstalled;
            }
        };

        if let Err(e) = self.runner.capture(binary, &["ps"], timeout) {
            tracing::warn!(error = %e, "container runtime daemon check failed");
            return RuntimeStatus::DaemonNotRunning;
        }

        tracing::info!(%version, "container runtime available");
        RuntimeStatus::Available { version }
    }

    /// Checks for a GPU by running the vendor diagnostic and looking for its marker.
    ///
    /// Never fails: any error counts as "no accelerator".
    pub fn probe_accelerator(&self) -> bool {
        let result = self.runner.capture(
            &self.config.accelerator_command,
            &[],
            self.config.quick_timeout(),
        );
        match result {
            Ok(output) => {
                let found = output.contains(self.config.accelerator_marker.as_str());
                tracing::info!(found, "accelerator diagnostic completed");
                found
            }
            Err(e) => {
                tracing::info!(error = %e, "no accelerator detected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use clara_common::error::{ClaraError, Result};

    use super::*;

    /// Answers each program/first-arg pair from a table and records calls.
    struct ScriptedRunner {
        answers: Vec<(&'static str, Result<String>)>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(answers: Vec<(&'static str, Result<String>)>) -> Self {
            Self {
                answers,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    fn failed(program: &str) -> Result<String> {
        Err(ClaraError::CommandFailed {
            program: program.into(),
            code: Some(1),
        })
    }

    impl CommandRunner for ScriptedRunner {
        fn capture(&self, program: &str, args: &[&str], _timeout: Duration) -> Result<String> {
            let key = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.borrow_mut().push(key.clone());
            match self.answers.iter().find(|(k, _)| *k == key) {
                Some((_, Ok(out))) => Ok(out.clone()),
                _ => failed(program),
            }
        }

        fn stream(&self, program: &str, _args: &[&str], _timeout: Duration) -> Result<()> {
            Err(ClaraError::CommandFailed {
                program: program.into(),
                code: Some(1),
            })
        }
    }

    #[test]
    fn runtime_available_when_both_checks_pass() {
        let runner = ScriptedRunner::new(vec![
            ("docker --version", Ok("Docker version 27.0.3".into())),
            ("docker ps", Ok(String::new())),
        ]);
        let config = InstallerConfig::default();
        let status = EnvironmentProber::new(&runner, &config).probe_runtime();
        assert_eq!(
            status,
            RuntimeStatus::Available {
                version: "Docker version 27.0.3".into()
            }
        );
    }

    #[test]
    fn version_failure_means_not_installed_and_skips_daemon_check() {
        let runner = ScriptedRunner::new(vec![]);
        let config = InstallerConfig::default();
        let status = EnvironmentProber::new(&runner, &config).probe_runtime();
        assert_eq!(status, RuntimeStatus::NotInstalled);
        assert_eq!(*runner.calls.borrow(), vec!["docker --version"]);
    }

    #[test]
    fn daemon_failure_means_not_running() {
        let runner = ScriptedRunner::new(vec![("docker --version", Ok("Docker".into()))]);
        let config = InstallerConfig::default();
        let status = EnvironmentProber::new(&runner, &config).probe_runtime();
        assert_eq!(status, RuntimeStatus::DaemonNotRunning);
        assert!(!status.is_available());
    }

    #[test]
    fn accelerator_requires_marker_in_output() {
        let runner = ScriptedRunner::new(vec![("nvidia-smi", Ok("no devices found".into()))]);
        let config = InstallerConfig::default();
        assert!(!EnvironmentProber::new(&runner, &config).probe_accelerator());
    }

    #[test]
    fn accelerator_detected_with_marker() {
        let runner = ScriptedRunner::new(vec![(
            "nvidia-smi",
            Ok("| NVIDIA-SMI 550.54  Driver Version: 550.54 |".into()),
        )]);
        let config = InstallerConfig::default();
        assert!(EnvironmentProber::new(&runner, &config).probe_accelerator());
    }

    #[test]
    fn accelerator_exit_failure_is_not_detected() {
        let runner = ScriptedRunner::new(vec![]);
        let config = InstallerConfig::default();
        assert!(!EnvironmentProber::new(&runner, &config).probe_accelerator());
    }

    #[test]
    fn accelerator_timeout_is_not_detected() {
        struct SlowRunner;
        impl CommandRunner for SlowRunner {
            fn capture(&self, program: &str, _: &[&str], timeout: Duration) -> Result<String> {
                Err(ClaraError::CommandTimedOut {
                    program: program.into(),
                    timeout_secs: timeout.as_secs(),
                })
            }
            fn stream(&self, _: &str, _: &[&str], _: Duration) -> Result<()> {
                Ok(())
            }
        }
        let config = InstallerConfig::default();
        assert!(!EnvironmentProber::new(&SlowRunner, &config).probe_accelerator());
    }
}
