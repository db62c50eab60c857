//! The installer flow: probe, select, deploy, wait, report.
//!
//! Every way a run can end is an [`Outcome`] variant; nothing below this
//! module decides the exit code.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use clara_common::catalog::Catalog;
use clara_common::config::InstallerConfig;
use clara_common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use clara_common::types::{EnvironmentSnapshot, ServiceDescriptor};
use clara_runtime::deploy::{ComposeDriver, DeployError, DeployStep, compose_hint};
use clara_runtime::health::{HealthCheck, HealthOutcome, HealthPoller, Sleeper};
use clara_runtime::probe::{EnvironmentProber, RuntimeStatus};
use clara_runtime::process::CommandRunner;

use crate::prompt;
use crate::style::{self, GREEN, RESET, YELLOW};
use crate::summary::{self, Desktop, Report};

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Services were deployed. Health polling may still have timed out.
    Installed {
        /// Result of health polling.
        health: HealthOutcome,
    },
    /// The container runtime is missing or not running.
    RuntimeUnavailable(RuntimeStatus),
    /// Pulling or starting the services failed.
    DeployFailed(DeployError),
    /// The operator stopped the run.
    Cancelled,
    /// Anything else, such as a broken terminal.
    Unexpected(anyhow::Error),
}

impl Outcome {
    /// Whether the run counts as a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::from(EXIT_SUCCESS)
        } else {
            ExitCode::from(EXIT_FAILURE)
        }
    }

    /// Prints the closing line for outcomes not already reported inline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn report(&self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            Self::Cancelled => writeln!(out, "{}", cancelled_message()),
            Self::Unexpected(e) => writeln!(out, "{}", style::error(&format!("Unexpected error: {e:#}"))),
            Self::Installed { .. } | Self::RuntimeUnavailable(_) | Self::DeployFailed(_) => Ok(()),
        }
    }
}

/// Line shown when the operator interrupts the installer.
pub fn cancelled_message() -> String {
    format!("\n{YELLOW}Installation cancelled by user{RESET}")
}

/// External collaborators of a run.
pub struct Services<'a> {
    /// Runs the runtime and compose commands.
    pub runner: &'a dyn CommandRunner,
    /// Performs single health requests.
    pub check: &'a dyn HealthCheck,
    /// Pauses between health rounds.
    pub sleeper: &'a dyn Sleeper,
    /// Address lookup and browser launch.
    pub desktop: &'a dyn Desktop,
}

/// One installer run over a fixed catalog and configuration.
pub struct Installer<'a, R, W> {
    config: &'a InstallerConfig,
    catalog: &'a Catalog,
    services: Services<'a>,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Installer<'a, R, W> {
    /// Creates an installer reading answers from `input` and writing to `out`.
    pub fn new(
        config: &'a InstallerConfig,
        catalog: &'a Catalog,
        services: Services<'a>,
        input: R,
        out: W,
    ) -> Self {
        Self {
            config,
            catalog,
            services,
            input,
            out,
        }
    }

    /// Runs the whole flow and reports how it ended.
    pub fn run(&mut self) -> Outcome {
        self.try_run().unwrap_or_else(Outcome::Unexpected)
    }

    fn try_run(&mut self) -> anyhow::Result<Outcome> {
        style::clear_screen(&mut self.out)?;
        writeln!(self.out, "{}", style::banner())?;
        writeln!(self.out, "{}", style::section_header("SYSTEM VERIFICATION"))?;

        let prober = EnvironmentProber::new(self.services.runner, self.config);
        let runtime = self.check_runtime(&prober)?;
        if !runtime.is_available() {
            return Ok(Outcome::RuntimeUnavailable(runtime));
        }
        let environment = EnvironmentSnapshot {
            runtime_available: true,
            accelerator_available: self.check_accelerator(&prober)?,
        };

        let catalog = self.catalog;
        let Some(selection) = prompt::select_services(catalog, &mut self.input, &mut self.out)?
        else {
            return Ok(Outcome::Cancelled);
        };
        let selected = catalog.selected(&selection);

        if let Err(e) = self.deploy(&selected)? {
            writeln!(self.out, "{}", style::error(&deploy_failure_message(&e)))?;
            tracing::error!(error = %e, "deployment failed");
            return Ok(Outcome::DeployFailed(e));
        }

        let health = self.wait_for_services(&selected)?;

        let report = Report {
            services: &selected,
            environment,
            config: self.config,
        };
        summary::present(&report, self.services.desktop, &mut self.input, &mut self.out)?;
        Ok(Outcome::Installed { health })
    }

    fn check_runtime(&mut self, prober: &EnvironmentProber<'_>) -> anyhow::Result<RuntimeStatus> {
        writeln!(self.out, "{}", style::step("Checking Docker installation..."))?;
        self.out.flush()?;

        let status = prober.probe_runtime();
        match &status {
            RuntimeStatus::Available { version } => {
                writeln!(self.out, "{}", style::info(&format!("Docker is available: {version}")))?;
            }
            RuntimeStatus::NotInstalled => {
                writeln!(self.out, "{}", style::error("Docker is not installed or not in PATH"))?;
                for line in style::install_guidance(std::env::consts::OS) {
                    writeln!(self.out, "{line}")?;
                }
            }
            RuntimeStatus::DaemonNotRunning => {
                writeln!(self.out, "{}", style::error("Docker daemon is not running"))?;
                writeln!(self.out, "{}", style::warning("Please start Docker Desktop and try again"))?;
            }
        }
        Ok(status)
    }

    fn check_accelerator(&mut self, prober: &EnvironmentProber<'_>) -> anyhow::Result<bool> {
        writeln!(self.out, "{}", style::step("Checking GPU availability..."))?;
        self.out.flush()?;

        let available = prober.probe_accelerator();
        if available {
            writeln!(
                self.out,
                "{}",
                style::info("NVIDIA GPU detected - CUDA acceleration will be enabled")
            )?;
        } else {
            writeln!(self.out, "{}", style::warning("No NVIDIA GPU detected - using CPU mode"))?;
        }
        Ok(available)
    }

    fn deploy(&mut self, selected: &[&ServiceDescriptor]) -> anyhow::Result<Result<(), DeployError>> {
        let ids: Vec<_> = selected.iter().map(|svc| svc.id.clone()).collect();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();

        writeln!(self.out, "{}", style::section_header("DEPLOYMENT"))?;
        writeln!(
            self.out,
            "{}",
            style::step(&format!("Deploying selected services: {}", names.join(", ")))
        )?;

        let driver = ComposeDriver::new(self.services.runner, self.config);
        let out = &mut self.out;
        let mut written = Ok(());
        let result = driver.deploy(&ids, |step| {
            if written.is_ok() {
                written = announce_step(&mut *out, step);
            }
        });
        written?;

        if result.is_ok() {
            writeln!(self.out, "{}", style::info("Services started successfully"))?;
        }
        Ok(result)
    }

    fn wait_for_services(&mut self, selected: &[&ServiceDescriptor]) -> anyhow::Result<HealthOutcome> {
        writeln!(self.out, "{}", style::section_header("HEALTH CHECK"))?;
        writeln!(self.out, "{}", style::step("Waiting for services to become healthy..."))?;
        self.out.flush()?;

        let poller = HealthPoller::new(
            self.config.health_host.clone(),
            self.config.health_max_attempts,
            self.config.health_interval(),
        );
        let out = &mut self.out;
        let mut written = Ok(());
        let outcome = poller.wait_healthy(
            selected,
            self.services.check,
            self.services.sleeper,
            |attempt, max| {
                if written.is_ok() {
                    let message = format!("Checking service health (attempt {attempt}/{max})");
                    written = write!(out, "{}", style::progress_bar(attempt, max, &message))
                        .and_then(|()| out.flush());
                }
            },
        );
        written?;

        match outcome {
            HealthOutcome::Healthy { .. } => {
                writeln!(self.out, "\n{GREEN}[✓] All selected services are healthy and ready!{RESET}")?;
            }
            HealthOutcome::TimedOut { .. } => {
                writeln!(self.out, "\n{YELLOW}[!] Services are taking longer than expected to start{RESET}")?;
                let hint = compose_hint(self.config, &["ps"]);
                writeln!(self.out, "{}", style::info(&format!("You can check status with: {hint}")))?;
            }
        }
        Ok(outcome)
    }
}

/// Child output goes straight to the terminal, so each line is flushed first.
fn announce_step(out: &mut impl Write, step: DeployStep) -> std::io::Result<()> {
    let line = match step {
        DeployStep::Pull => style::step("Pulling Docker images (this may take several minutes)..."),
        DeployStep::Start => style::step("Starting services..."),
    };
    writeln!(out, "{line}")?;
    out.flush()
}

fn deploy_failure_message(error: &DeployError) -> String {
    match error {
        DeployError::NothingSelected => "No services selected for deployment".into(),
        DeployError::Pull(_) => "Failed to pull Docker images".into(),
        DeployError::Start(_) => "Failed to start services".into(),
    }
}
