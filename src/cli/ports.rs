//! Ports subcommand implementation.
//!
//! Handles `rfid-bridge ports`, used to find which device the reader is on.

use crate::error::CliResult;
use crate::output;
use crate::serial::list_ports;
use clap::Parser;

/// List serial ports visible to the OS.
#[derive(Parser, Debug)]
pub struct PortsCommand {
    /// Only show USB ports
    #[arg(long)]
    pub usb: bool,
}

impl PortsCommand {
    /// Execute the ports command.
    pub fn execute(&self) -> CliResult<()> {
        let mut ports = list_ports()?;
        if self.usb {
            ports.retain(|p| p.kind == "USB");
        }
        output::print_ports(&ports)?;
        Ok(())
    }
}
