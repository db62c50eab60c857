//! Compose-based deployment of the selected services.

use clara_common::config::InstallerConfig;
use clara_common::error::ClaraError;
use clara_common::types::ServiceId;
use thiserror::Error;

use crate::process::CommandRunner;

/// Why a deployment stopped.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The driver was called with an empty service list.
    #[error("no services selected for deployment")]
    NothingSelected,

    /// Pulling images failed; nothing was started.
    #[error("failed to pull images: {0}")]
    Pull(#[source] ClaraError),

    /// Starting containers failed after a successful pull.
    #[error("failed to start services: {0}")]
    Start(#[source] ClaraError),
}

/// Step the driver is about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    /// `compose pull`.
    Pull,
    /// `compose up -d`.
    Start,
}

/// Drives `docker compose pull` and `docker compose up -d`.
pub struct ComposeDriver<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a InstallerConfig,
}

impl<'a> ComposeDriver<'a> {
    /// Creates a driver.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, config: &'a InstallerConfig) -> Self {
        Self { runner, config }
    }

    /// Pulls and then starts exactly `services`.
    ///
    /// Output streams to the terminal. `on_step` is called right before each
    /// step starts. A failed pull skips the start step; nothing is retried
    /// or rolled back.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::NothingSelected` for an empty list, otherwise the
    /// step that failed.
    pub fn deploy(
        &self,
        services: &[ServiceId],
        mut on_step: impl FnMut(DeployStep),
    ) -> Result<(), DeployError> {
        if services.is_empty() {
            return Err(DeployError::NothingSelected);
        }

        on_step(DeployStep::Pull);
        tracing::info!(?services, "pulling images");
        self.run(&["pull"], services).map_err(DeployError::Pull)?;

        on_step(DeployStep::Start);
        tracing::info!(?services, "starting services");
        self.run(&["up", "-d"], services).map_err(DeployError::Start)?;

        tracing::info!("services started");
        Ok(())
    }

    fn run(&self, subcommand: &[&str], services: &[ServiceId]) -> Result<(), ClaraError> {
        let (program, args) = compose_invocation(self.config, subcommand, services);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .stream(&program, &args, self.config.long_timeout())
    }
}

/// Program and arguments for a compose subcommand over `services`.
#[must_use]
pub fn compose_invocation(
    config: &InstallerConfig,
    subcommand: &[&str],
    services: &[ServiceId],
) -> (String, Vec<String>) {
    let mut parts = config.compose_command.iter().cloned();
    let program = parts.next().unwrap_or_default();
    let mut args: Vec<String> = parts.collect();
    if let Some(file) = &config.compose_file {
        args.push("-f".into());
        args.push(file.display().to_string());
    }
    args.extend(subcommand.iter().map(|s| (*s).to_owned()));
    args.extend(services.iter().map(|id| id.as_str().to_owned()));
    (program, args)
}

/// Shell line an operator can type to run a compose subcommand later.
#[must_use]
pub fn compose_hint(config: &InstallerConfig, subcommand: &[&str]) -> String {
    let (program, args) = compose_invocation(config, subcommand, &[]);
    std::iter::once(program)
        .chain(args)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::Duration;

    use clara_common::error::Result;

    use super::*;

    #[derive(Default)]
    struct RecordingRunner {
        fail_on: Option<&'static str>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl CommandRunner for RecordingRunner {
        fn capture(&self, _: &str, _: &[&str], _: Duration) -> Result<String> {
            Ok(String::new())
        }

        fn stream(&self, program: &str, args: &[&str], _: Duration) -> Result<()> {
            let call: Vec<String> = std::iter::once(program)
                .chain(args.iter().copied())
                .map(str::to_owned)
                .collect();
            let failing = self.fail_on.is_some_and(|sub| args.contains(&sub));
            self.calls.borrow_mut().push(call);
            if failing {
                return Err(ClaraError::CommandFailed {
                    program: program.into(),
                    code: Some(1),
                });
            }
            Ok(())
        }
    }

    fn ids(names: &[&str]) -> Vec<ServiceId> {
        names.iter().map(|n| ServiceId::new(*n)).collect()
    }

    #[test]
    fn deploy_pulls_then_starts_exactly_selected() {
        let runner = RecordingRunner::default();
        let config = InstallerConfig::default();
        ComposeDriver::new(&runner, &config)
            .deploy(&ids(&["clara_comfyui", "clara_n8n"]), |_| {})
            .unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                vec!["docker", "compose", "pull", "clara_comfyui", "clara_n8n"],
                vec!["docker", "compose", "up", "-d", "clara_comfyui", "clara_n8n"],
            ]
        );
    }

    #[test]
    fn pull_failure_skips_start() {
        let runner = RecordingRunner {
            fail_on: Some("pull"),
            ..RecordingRunner::default()
        };
        let config = InstallerConfig::default();
        let mut steps = Vec::new();
        let err = ComposeDriver::new(&runner, &config)
            .deploy(&ids(&["clara_python"]), |step| steps.push(step))
            .unwrap_err();

        assert!(matches!(err, DeployError::Pull(_)));
        assert_eq!(runner.calls.borrow().len(), 1);
        assert_eq!(steps, vec![DeployStep::Pull]);
    }

    #[test]
    fn start_failure_is_reported() {
        let runner = RecordingRunner {
            fail_on: Some("up"),
            ..RecordingRunner::default()
        };
        let config = InstallerConfig::default();
        let err = ComposeDriver::new(&runner, &config)
            .deploy(&ids(&["clara_python"]), |_| {})
            .unwrap_err();

        assert!(matches!(err, DeployError::Start(_)));
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    #[test]
    fn empty_selection_runs_nothing() {
        let runner = RecordingRunner::default();
        let config = InstallerConfig::default();
        let mut steps = Vec::new();
        let err = ComposeDriver::new(&runner, &config)
            .deploy(&[], |step| steps.push(step))
            .unwrap_err();
        assert!(matches!(err, DeployError::NothingSelected));
        assert!(runner.calls.borrow().is_empty());
        assert!(steps.is_empty());
    }

    #[test]
    fn steps_are_announced_before_each_command() {
        let runner = RecordingRunner::default();
        let config = InstallerConfig::default();
        let mut seen = Vec::new();
        ComposeDriver::new(&runner, &config)
            .deploy(&ids(&["clara_n8n"]), |step| {
                seen.push((step, runner.calls.borrow().len()));
            })
            .unwrap();
        assert_eq!(seen, vec![(DeployStep::Pull, 0), (DeployStep::Start, 1)]);
    }

    #[test]
    fn compose_file_goes_before_subcommand() {
        let config = InstallerConfig {
            compose_file: Some(PathBuf::from("stack/compose.yml")),
            ..InstallerConfig::default()
        };
        let (program, args) = compose_invocation(&config, &["pull"], &ids(&["clara_n8n"]));
        assert_eq!(program, "docker");
        assert_eq!(args, vec!["compose", "-f", "stack/compose.yml", "pull", "clara_n8n"]);
    }

    #[test]
    fn hint_renders_a_shell_line() {
        let config = InstallerConfig::default();
        assert_eq!(compose_hint(&config, &["logs", "-f"]), "docker compose logs -f");
    }
}
