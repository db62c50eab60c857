//! Stateless terminal formatting.
//!
//! Every helper returns a `String` (or writes a fixed escape sequence), so
//! any part of the installer can format output without shared state.

use std::io::Write;

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const WHITE: &str = "\x1b[37m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

const RULE_WIDTH: usize = 80;
const BAR_WIDTH: usize = 50;

/// Success line, `[✓]` in green.
pub fn info(message: &str) -> String {
    format!("{GREEN}[✓] {message}{RESET}")
}

/// Warning line, `[!]` in yellow.
pub fn warning(message: &str) -> String {
    format!("{YELLOW}[!] {message}{RESET}")
}

/// Error line, `[✗]` in red.
pub fn error(message: &str) -> String {
    format!("{RED}[✗] {message}{RESET}")
}

/// In-progress line, `[*]` in yellow.
pub fn step(message: &str) -> String {
    format!("{YELLOW}[*] {message}{RESET}")
}

/// Horizontal rule in blue.
pub fn rule() -> String {
    format!("{BLUE}{}{RESET}", "=".repeat(RULE_WIDTH))
}

/// Framed section title.
pub fn section_header(title: &str) -> String {
    format!(
        "\n{rule}\n{BOLD}{WHITE}                        [{title}]                          {RESET}\n{rule}\n",
        rule = rule()
    )
}

/// Number of filled cells for `step` of `total`, floored.
pub fn progress_filled(step: u32, total: u32) -> usize {
    if total == 0 {
        return 0;
    }
    let filled = u64::from(step.min(total)) * BAR_WIDTH as u64 / u64::from(total);
    usize::try_from(filled).unwrap_or(BAR_WIDTH)
}

/// Single-line progress bar, prefixed with `\r` so it redraws in place.
pub fn progress_bar(step: u32, total: u32, message: &str) -> String {
    let filled = progress_filled(step, total);
    let percentage = if total == 0 {
        0.0
    } else {
        f64::from(step) / f64::from(total) * 100.0
    };
    format!(
        "\r{CYAN}[{}{}] {percentage:.1}% {message}{RESET}",
        "█".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

/// Clears the screen and homes the cursor.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn clear_screen(out: &mut impl Write) -> std::io::Result<()> {
    crossterm::queue!(
        out,
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        crossterm::cursor::MoveTo(0, 0)
    )?;
    out.flush()
}

/// Enables escape-sequence processing on consoles that need it.
///
/// Returns whether the terminal reports ANSI support.
#[allow(clippy::missing_const_for_fn)]
pub fn enable_ansi() -> bool {
    #[cfg(windows)]
    {
        crossterm::ansi_support::supports_ansi()
    }
    #[cfg(not(windows))]
    {
        true
    }
}

/// Opening banner.
pub fn banner() -> String {
    format!(
        r"
{CYAN}
     #####  #        #####  ######   #####  #     # ####### ######   ##### #######
    #     # #       #     # #     # #     # #     # #       #     # #     # #
    #       #       ####### ######  ####### #     # #####   ######   #####  #####
    #       #       #     # #   #   #     #  #   #  #       #   #        #  #
    #     # #       #     # #    #  #     #  #   #  #       #    #  #     # #
     #####  ####### #     # #     # #     #   ###   ####### #     #  #####  #######
{RESET}

{BOLD}{MAGENTA}                    REMOTE SERVER DEPLOYMENT{RESET}
{CYAN}                          The AI-Powered Creative Suite{RESET}

{YELLOW}    +==================================================================+{RESET}
{YELLOW}    :                                                                  :{RESET}
{YELLOW}    :  {WHITE}ComfyUI     - AI Image Generation Powerhouse{YELLOW}                :{RESET}
{YELLOW}    :  {WHITE}Python Backend - Advanced AI Processing APIs{YELLOW}                :{RESET}
{YELLOW}    :  {WHITE}n8n Workflows - Automation Made Simple{YELLOW}                      :{RESET}
{YELLOW}    :                                                                  :{RESET}
{YELLOW}    +==================================================================+{RESET}

{GREEN}        Auto-GPU Detection  -  Secure Deployment  -  Production Ready{RESET}
"
    )
}

/// Closing banner shown above the summary.
pub fn success_banner() -> String {
    format!(
        r"
{GREEN}
    ######  ####### ######  #       ####### #     # ####### ######
    #     # #       #     # #       #     #  #   #  #       #     #
    #     # #####   ######  #       #     #   # #   #####   #     #
    #     # #       #       #       #     #    #    #       #     #
    #     # #       #       #       #     #    #    #       #     #
    ######  ####### #       ####### #######    #    ####### ######
{RESET}

{BOLD}{MAGENTA}    +=================================================================+{RESET}
{BOLD}{MAGENTA}    :                                                                 :{RESET}
{BOLD}{MAGENTA}    :             CLARAVERSE DEPLOYMENT SUCCESSFUL!                  :{RESET}
{BOLD}{MAGENTA}    :                                                                 :{RESET}
{BOLD}{MAGENTA}    +=================================================================+{RESET}
"
    )
}

/// Remediation lines for a missing container runtime on `os`
/// (a `std::env::consts::OS` value).
pub fn install_guidance(os: &str) -> Vec<String> {
    let steps = match os {
        "windows" => [
            "1. Download Docker Desktop for Windows",
            "2. https://docs.docker.com/desktop/windows/install/",
        ],
        "macos" => [
            "1. Download Docker Desktop for Mac",
            "2. https://docs.docker.com/desktop/mac/install/",
        ],
        _ => [
            "1. Install Docker Engine: sudo apt install docker.io",
            "2. Start Docker: sudo systemctl start docker",
        ],
    };
    std::iter::once(format!("\n{YELLOW}Please install Docker:{RESET}"))
        .chain(steps.iter().map(|s| format!("{WHITE}   {s}{RESET}")))
        .collect()
}
