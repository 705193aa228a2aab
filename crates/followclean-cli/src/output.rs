use std::io::Write;

use followclean_core::config_file::ConfigFile;
use followclean_core::{Account, LogEntry, RunSummary};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One line per processed account, green for success and red for failure.
pub fn outcome_line(index: usize, total: usize, entry: &LogEntry, color: ColorMode) -> String {
    let prefix = format!("[{}/{}]", index + 1, total);
    let message = entry.message();
    if !color.enabled() {
        return format!("{prefix} {message}");
    }
    if entry.outcome.is_success() {
        format!("{} {}", prefix.dimmed(), message.green())
    } else {
        format!("{} {}", prefix.dimmed(), message.red())
    }
}

pub fn summary_line(summary: &RunSummary, color: ColorMode) -> String {
    let line = summary.status_line();
    if !color.enabled() {
        line
    } else if summary.failed == 0 && !summary.stopped_early {
        line.green().bold().to_string()
    } else {
        line.yellow().bold().to_string()
    }
}

/// Write an account list as pretty JSON followed by a newline.
pub fn write_accounts(w: &mut dyn Write, accounts: &[Account]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, accounts)?;
    writeln!(w)?;
    Ok(())
}

/// Config as it would be saved.
pub fn write_config(w: &mut dyn Write, config: &ConfigFile) -> anyhow::Result<()> {
    write!(w, "{}", toml::to_string_pretty(config)?)?;
    Ok(())
}

/// Scan summary printed to stderr so stdout stays valid JSON.
pub fn print_scan_summary(
    w: &mut dyn Write,
    accounts: &[Account],
    color: ColorMode,
) -> std::io::Result<()> {
    if accounts.is_empty() {
        let line = "No accounts found on the page";
        if color.enabled() {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{line}")?;
        }
        return Ok(());
    }
    let line = format!("Found {} accounts", accounts.len());
    if color.enabled() {
        writeln!(w, "{}", line.bold())?;
    } else {
        writeln!(w, "{line}")?;
    }
    if let (Some(oldest), Some(newest)) = (accounts.first(), accounts.last()) {
        writeln!(w, "  oldest follow: {} ({})", oldest.display_name, oldest.handle)?;
        writeln!(w, "  newest follow: {} ({})", newest.display_name, newest.handle)?;
    }
    Ok(())
}
