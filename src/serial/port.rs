//! Serial port frame source.
//!
//! Opens the RFID reader with `serialport` and reads frames on tokio's
//! blocking pool, since serial reads have no async API.
//!
//! The blocking read owns the port while it runs. Its task handle is kept
//! on the source, so a read cancelled by the caller is picked up again by
//! the next `next_frame` and awaited by `close` before the port is dropped.

use super::reader::LineReader;
use super::traits::FrameSource;
use crate::config::SerialSettings;
use crate::error::{FrameError, FrameResult};
use crate::types::Frame;
use async_trait::async_trait;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type PortReader = LineReader<Box<dyn SerialPort>>;
type ReadTask = JoinHandle<(PortReader, FrameResult<Option<Frame>>)>;

/// Frame source backed by a physical serial device.
///
/// Opening the device is allowed to fail: the source is then created
/// disconnected and every read reports the device as unavailable until
/// [`FrameSource::reopen`] succeeds.
pub struct SerialFrameSource {
    settings: SerialSettings,
    reader: Option<PortReader>,
    in_flight: Option<ReadTask>,
}

impl SerialFrameSource {
    /// Attempt to open the configured device once.
    pub fn connect(settings: SerialSettings) -> Self {
        let mut source = Self {
            settings,
            reader: None,
            in_flight: None,
        };

        info!(device = %source.settings.device, "trying serial device");
        if let Err(e) = source.open() {
            warn!(device = %source.settings.device, error = %e, "failed to connect on device");
        }

        source
    }

    fn open(&mut self) -> FrameResult<()> {
        let port = serialport::new(&self.settings.device, self.settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.settings.read_timeout())
            .open()
            .map_err(|e| FrameError::DeviceUnavailable(format!("{}: {}", self.settings.device, e)))?;

        info!(
            device = %self.settings.device,
            baud = self.settings.baud_rate,
            "serial device opened"
        );
        self.reader = Some(LineReader::new(port));
        Ok(())
    }

    /// Await the in-flight read and take back the port it holds.
    ///
    /// The task stays on `self` until it completes, so cancelling this
    /// future leaves the read to be resumed later.
    async fn finish_read(&mut self) -> FrameResult<(PortReader, FrameResult<Option<Frame>>)> {
        let Some(task) = self.in_flight.as_mut() else {
            return Err(FrameError::DeviceUnavailable(self.settings.device.clone()));
        };
        let joined = task.await;
        self.in_flight = None;
        joined.map_err(|e| FrameError::DeviceUnavailable(format!("read task failed: {}", e)))
    }
}

#[async_trait]
impl FrameSource for SerialFrameSource {
    fn describe(&self) -> String {
        format!("{} @ {} baud", self.settings.device, self.settings.baud_rate)
    }

    fn is_connected(&self) -> bool {
        self.reader.is_some() || self.in_flight.is_some()
    }

    async fn next_frame(&mut self) -> FrameResult<Option<Frame>> {
        if self.in_flight.is_none() {
            let mut reader = self
                .reader
                .take()
                .ok_or_else(|| FrameError::DeviceUnavailable(self.settings.device.clone()))?;

            self.in_flight = Some(tokio::task::spawn_blocking(move || {
                let result = reader.read_frame();
                (reader, result)
            }));
        }

        let (reader, result) = self.finish_read().await?;

        // An I/O fault usually means the device went away; drop the handle
        // so the next reopen starts clean.
        if matches!(result, Err(FrameError::Io(_)) | Err(FrameError::Closed)) {
            debug!(device = %self.settings.device, "dropping serial handle after read fault");
        } else {
            self.reader = Some(reader);
        }

        result
    }

    async fn reopen(&mut self) -> FrameResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.open()
    }

    async fn close(&mut self) {
        let mut released = self.reader.take().is_some();
        if self.in_flight.is_some() {
            debug!(device = %self.settings.device, "waiting for in-flight serial read");
            match self.finish_read().await {
                Ok(_) => released = true,
                Err(e) => warn!(device = %self.settings.device, error = %e, "serial read task lost"),
            }
        }
        if released {
            info!(device = %self.settings.device, "serial device closed");
        }
    }
}

/// Information about a detected serial port.
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub path: String,
    pub kind: &'static str,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid_pid: Option<(u16, u16)>,
}

/// List all serial ports visible to the OS.
pub fn list_ports() -> FrameResult<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| FrameError::DeviceUnavailable(format!("failed to enumerate ports: {}", e)))?;

    Ok(ports
        .into_iter()
        .map(|p| match p.port_type {
            serialport::SerialPortType::UsbPort(usb) => PortInfo {
                path: p.port_name,
                kind: "USB",
                manufacturer: usb.manufacturer,
                product: usb.product,
                serial_number: usb.serial_number,
                vid_pid: Some((usb.vid, usb.pid)),
            },
            other => PortInfo {
                path: p.port_name,
                kind: match other {
                    serialport::SerialPortType::PciPort => "PCI",
                    serialport::SerialPortType::BluetoothPort => "Bluetooth",
                    _ => "Unknown",
                },
                manufacturer: None,
                product: None,
                serial_number: None,
                vid_pid: None,
            },
        })
        .collect())
}
