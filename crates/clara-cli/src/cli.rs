//! Command-line surface and top-level dispatch.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clara_common::catalog::Catalog;
use clara_common::config::InstallerConfig;
use clara_common::constants::EXIT_FAILURE;
use clara_runtime::health::{HttpHealthCheck, ThreadSleeper};
use clara_runtime::process::SystemRunner;

use crate::summary::SystemDesktop;
use crate::workflow::{self, Installer, Outcome, Services};

/// ClaraVerse Remote Server Installer.
///
/// Deploys ComfyUI, the Python Backend, and n8n with Docker Compose.
/// Run without arguments for the interactive installation.
#[derive(Parser, Debug)]
#[command(name = "clara-install", version, about, long_about = None, after_help = services_help())]
pub struct Cli {
    /// JSON configuration file overriding the built-in defaults.
    #[arg(long, env = "CLARA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compose file to deploy from (defaults to the one in the current directory).
    #[arg(short = 'f', long, env = "CLARA_COMPOSE_FILE")]
    pub compose_file: Option<PathBuf>,

    /// Number of health-check rounds before giving up.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds to wait between health-check rounds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Do not offer to open the first service in a browser.
    #[arg(long)]
    pub no_browser: bool,
}

impl Cli {
    /// Builds the effective configuration: file (or defaults), then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is unreadable or the
    /// result is invalid.
    pub fn resolve_config(&self) -> anyhow::Result<InstallerConfig> {
        let mut config = match &self.config {
            Some(path) => InstallerConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => InstallerConfig::default(),
        };
        if let Some(file) = &self.compose_file {
            config.compose_file = Some(file.clone());
        }
        if let Some(attempts) = self.max_attempts {
            config.health_max_attempts = attempts;
        }
        if let Some(interval) = self.interval {
            config.health_interval_secs = interval;
        }
        if self.no_browser {
            config.open_browser = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn services_help() -> String {
    let mut help = String::from(
        "Requirements:\n    - Docker or Docker Desktop\n    - Internet connection\n\nServices:\n",
    );
    for svc in Catalog::builtin().services() {
        let label = format!("{}:", svc.name);
        help.push_str(&format!("    - {label:<16} {} (Port {})\n", svc.description, svc.port));
    }
    help
}

/// Runs the interactive installer and reports how it ended.
pub fn execute(cli: &Cli) -> Outcome {
    let outcome = match cli.resolve_config() {
        Ok(config) => install(&config),
        Err(e) => Outcome::Unexpected(e),
    };
    let _ = outcome.report(&mut io::stdout());
    tracing::info!(success = outcome.is_success(), "installer finished");
    outcome
}

fn install(config: &InstallerConfig) -> Outcome {
    if let Err(e) = install_interrupt_handler() {
        return Outcome::Unexpected(e);
    }
    let check = match HttpHealthCheck::new(config.health_request_timeout()) {
        Ok(check) => check,
        Err(e) => return Outcome::Unexpected(e.into()),
    };

    let catalog = Catalog::builtin();
    let services = Services {
        runner: &SystemRunner,
        check: &check,
        sleeper: &ThreadSleeper,
        desktop: &SystemDesktop,
    };
    Installer::new(config, &catalog, services, io::stdin().lock(), io::stdout()).run()
}

/// Ctrl+C ends the run at once with a calm message and a failure status.
fn install_interrupt_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let mut out = io::stdout();
        let _ = writeln!(out, "{}", workflow::cancelled_message());
        let _ = out.flush();
        std::process::exit(i32::from(EXIT_FAILURE));
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))
}
