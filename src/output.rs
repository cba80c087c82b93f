//! Console output helpers.
//!
//! Log lines go through `tracing`; this module covers the few messages
//! meant for a human at the terminal.

use crate::bridge::BridgeStats;
use crate::config::Settings;
use crate::serial::PortInfo;
use console::style;
use std::io::{self, Write};

/// Print the startup header before the bridge loop begins.
pub fn print_bridge_header(settings: &Settings) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("rfid-bridge").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Serial: {} @ {} baud",
        style("•").dim(),
        style(&settings.serial.device).white().bold(),
        settings.serial.baud_rate
    );
    println!(
        "{} Database: {}@{}:{}/{} → {}",
        style("•").dim(),
        settings.database.user,
        settings.database.host,
        settings.database.port,
        settings.database.database,
        style(&settings.database.table).yellow()
    );
    println!(
        "{} Polling every {} ms, Ctrl-C to stop",
        style("•").dim(),
        settings.bridge.poll_interval_ms
    );
    println!();
}

/// Print the session totals after shutdown.
pub fn print_stats(stats: &BridgeStats) {
    println!();
    println!("{} {}", style("Session:").bold(), stats.summary());
    if let Some(at) = stats.last_insert_at {
        println!(
            "         last row inserted at {}",
            style(at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
        );
    }
}

/// Print detected serial ports.
pub fn print_ports(ports: &[PortInfo]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if ports.is_empty() {
        writeln!(out, "{}", style("No serial ports found").yellow())?;
        writeln!(
            out,
            "  Check the reader is plugged in and that you can access the device (e.g. the 'dialout' group)."
        )?;
        return Ok(());
    }

    writeln!(out, "{}", style("Available serial ports:").green().bold())?;
    for port in ports {
        writeln!(out)?;
        writeln!(out, "  {} ({})", style(&port.path).white().bold(), port.kind)?;
        if let Some(ref manufacturer) = port.manufacturer {
            writeln!(out, "    Manufacturer: {}", manufacturer)?;
        }
        if let Some(ref product) = port.product {
            writeln!(out, "    Product: {}", truncate_string(product, 48))?;
        }
        if let Some(ref serial) = port.serial_number {
            writeln!(out, "    Serial: {}", serial)?;
        }
        if let Some((vid, pid)) = port.vid_pid {
            writeln!(out, "    VID:PID: {:04x}:{:04x}", vid, pid)?;
        }
    }

    Ok(())
}

/// Print settings as pretty JSON, with the password masked.
pub fn print_settings(settings: &Settings) -> io::Result<()> {
    let mut masked = settings.clone();
    if !masked.database.password.is_empty() {
        masked.database.password = "********".to_string();
    }
    let json = serde_json::to_string_pretty(&masked)?;
    println!("{}", json);
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_string("ÄÖÜäöüß-reader", 8), "ÄÖÜäö...");
    }
}
