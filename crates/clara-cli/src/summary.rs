//! Final report: where the services live and how to manage them.

use std::io::{self, BufRead, Write};
use std::net::ToSocketAddrs;
use std::process::{Command, Stdio};

use clara_common::config::InstallerConfig;
use clara_common::constants::{APP_NAME, LOOPBACK_HOST};
use clara_common::types::{EnvironmentSnapshot, ServiceDescriptor};
use clara_runtime::deploy::compose_hint;

use crate::style::{self, BLUE, BOLD, CYAN, GREEN, RESET, WHITE, YELLOW};

/// Host integration used by the summary screen.
pub trait Desktop {
    /// Address other machines can use to reach this host.
    fn local_address(&self) -> String;

    /// Opens `url` in the default browser.
    ///
    /// # Errors
    ///
    /// Returns an error if no opener is available or it cannot be started.
    fn open_browser(&self, url: &str) -> anyhow::Result<()>;
}

/// [`Desktop`] for the machine the installer runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
    fn local_address(&self) -> String {
        resolve_address(hostname().as_deref())
    }

    fn open_browser(&self, url: &str) -> anyhow::Result<()> {
        let (opener, leading) = BROWSER_OPENER;
        let program = which::which(opener)?;
        let _child = Command::new(program)
            .args(leading)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

#[cfg(target_os = "windows")]
const BROWSER_OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
#[cfg(target_os = "macos")]
const BROWSER_OPENER: (&str, &[&str]) = ("open", &[]);
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const BROWSER_OPENER: (&str, &[&str]) = ("xdg-open", &[]);

#[cfg(unix)]
fn hostname() -> Option<String> {
    nix::unistd::gethostname().ok()?.into_string().ok()
}

#[cfg(not(unix))]
fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}

/// Resolves `hostname` to its first IPv4 address, or the loopback name.
pub fn resolve_address(hostname: Option<&str>) -> String {
    hostname
        .filter(|h| !h.is_empty())
        .and_then(|h| (h, 0).to_socket_addrs().ok())
        .and_then(|mut addrs| addrs.find(|a| a.is_ipv4()))
        .map_or_else(|| LOOPBACK_HOST.to_owned(), |a| a.ip().to_string())
}

/// Everything the summary needs to know about the finished run.
pub struct Report<'a> {
    /// Services that were deployed.
    pub services: &'a [&'a ServiceDescriptor],
    /// What the environment probe found.
    pub environment: EnvironmentSnapshot,
    /// Active configuration.
    pub config: &'a InstallerConfig,
}

/// Prints the success screen and optionally opens the first service.
///
/// # Errors
///
/// Returns an error if writing output fails. Browser failures are ignored.
pub fn present<R: BufRead, W: Write>(
    report: &Report<'_>,
    desktop: &dyn Desktop,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    style::clear_screen(out)?;
    writeln!(out, "{}", style::success_banner())?;
    writeln!(out, "{CYAN}Your selected {APP_NAME} services are now running:{RESET}\n")?;

    let address = desktop.local_address();
    write_service_table(out, report.services, &address)?;
    write_management_hints(out, report.config)?;
    write_system_info(out, report)?;

    writeln!(out, "{}", style::rule())?;
    writeln!(out, "{BOLD}{WHITE}Thank you for using {APP_NAME}! Happy creating!{RESET}")?;
    writeln!(out, "{}\n", style::rule())?;

    if report.config.open_browser {
        if let Some(first) = report.services.first() {
            offer_browser(first, &address, desktop, input, out)?;
        }
    }
    Ok(())
}

fn write_service_table<W: Write>(
    out: &mut W,
    services: &[&ServiceDescriptor],
    address: &str,
) -> io::Result<()> {
    let border = format!("{WHITE}    +{}+{RESET}", "-".repeat(65));
    let blank = format!("{WHITE}    :{}:{RESET}", " ".repeat(65));
    writeln!(out, "{border}")?;
    writeln!(out, "{blank}")?;
    for svc in services {
        writeln!(
            out,
            "{WHITE}    :  {BOLD}{BLUE}{:<13}{RESET} {YELLOW}{}{RESET}",
            svc.name,
            svc.access_url(address)
        )?;
    }
    writeln!(out, "{blank}")?;
    writeln!(out, "{border}\n")
}

fn write_management_hints<W: Write>(out: &mut W, config: &InstallerConfig) -> io::Result<()> {
    let hints: [(&str, &[&str]); 4] = [
        ("Check Status:", &["ps"]),
        ("View Logs:   ", &["logs", "-f"]),
        ("Restart:     ", &["restart"]),
        ("Stop:        ", &["down"]),
    ];
    writeln!(out, "{GREEN}Quick Management Commands:{RESET}")?;
    for (label, subcommand) in hints {
        writeln!(out, "{CYAN}    {label} {WHITE}{}{RESET}", compose_hint(config, subcommand))?;
    }
    writeln!(out)
}

fn write_system_info<W: Write>(out: &mut W, report: &Report<'_>) -> io::Result<()> {
    writeln!(out, "{BOLD}{GREEN}System Specifications:{RESET}")?;
    if report.environment.accelerator_available {
        writeln!(out, "{WHITE}  • GPU: NVIDIA GPU with CUDA support{RESET}")?;
    } else {
        writeln!(out, "{WHITE}  • Mode: CPU-only deployment{RESET}")?;
    }
    let names: Vec<&str> = report.services.iter().map(|s| s.name.as_str()).collect();
    writeln!(out, "{WHITE}  • Services: {}{RESET}", names.join(", "))?;
    writeln!(
        out,
        "{WHITE}  • Platform: {} {}{RESET}\n",
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn offer_browser<R: BufRead, W: Write>(
    service: &ServiceDescriptor,
    address: &str,
    desktop: &dyn Desktop,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    write!(
        out,
        "{YELLOW}Press Enter to open {} in your browser...{RESET}",
        service.name
    )?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(());
    }

    let url = service.access_url(address);
    match desktop.open_browser(&url) {
        Ok(()) => writeln!(out, "{}", style::info(&format!("Browser opened to {}", service.name))),
        Err(e) => {
            tracing::debug!(%url, error = %e, "could not open browser");
            Ok(())
        }
    }
}
