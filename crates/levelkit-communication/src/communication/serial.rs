//! Serial port communication implementation
//!
//! Provides the serial link used to probe a bed on a real controller:
//! - Port enumeration and discovery
//! - A line reader running on a blocking thread
//! - Line writes terminated by `\n`
//! - Controller settings read through `$$`

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use levelkit_core::ProbeError;
use serde::Serialize;
use tokio::sync::mpsc;

use super::ControllerChannel;
use crate::firmware::grbl::settings::{read_settings, FREE_MOVE_FEEDRATE_SETTING};

/// Read timeout of the blocking reader; bounds how long shutdown takes
const READ_POLL: Duration = Duration::from_millis(100);

/// Information about an available serial port
#[derive(Debug, Clone, Serialize)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports that look like CNC controllers
///
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ProbeError> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ProbeError::Io {
            reason: format!("Failed to enumerate ports: {}", e),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_cnc_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb) => {
                    let info = info.with_usb_ids(usb.vid, usb.pid);
                    match &usb.manufacturer {
                        Some(mfg) => info.with_manufacturer(mfg),
                        None => info,
                    }
                }
                _ => info,
            }
        })
        .collect())
}

fn is_cnc_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb) => format!(
            "USB {} {}",
            usb.manufacturer.as_deref().unwrap_or("Device"),
            usb.product.as_deref().unwrap_or("Serial Port")
        ),
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Serial connection to a GRBL controller
///
/// Reads happen on a dedicated thread that forwards complete lines into a
/// tokio channel, so [`ControllerChannel::next_line`] never blocks the runtime.
pub struct SerialLink {
    port_name: String,
    writer: Box<dyn serialport::SerialPort>,
    lines: mpsc::UnboundedReceiver<String>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    settings: HashMap<u16, String>,
}

impl SerialLink {
    /// Open `port_name` at `baud_rate` (8N1, no flow control)
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, ProbeError> {
        let writer = serialport::new(port_name, baud_rate)
            .timeout(READ_POLL)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", port_name, e);
                ProbeError::Io {
                    reason: format!("Failed to open port {}: {}", port_name, e),
                }
            })?;

        let reader_port = writer.try_clone().map_err(|e| ProbeError::Io {
            reason: format!("Failed to clone port {}: {}", port_name, e),
        })?;

        let (tx, lines) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let stop = Arc::clone(&stop);
            let name = port_name.to_string();
            std::thread::Builder::new()
                .name(format!("serial-reader-{}", name))
                .spawn(move || read_lines(reader_port, tx, stop, name))
                .map_err(|e| ProbeError::Io {
                    reason: e.to_string(),
                })?
        };

        tracing::info!("Opened serial port {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port_name: port_name.to_string(),
            writer,
            lines,
            stop,
            reader: Some(reader),
            settings: HashMap::new(),
        })
    }

    /// Port this link is attached to
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Re-read the controller's `$` settings
    pub async fn refresh_settings(&mut self, timeout: Duration) -> Result<(), ProbeError> {
        self.settings = read_settings(self, timeout).await?;
        Ok(())
    }

    /// Last settings read by [`Self::refresh_settings`]
    pub fn settings(&self) -> &HashMap<u16, String> {
        &self.settings
    }
}

fn read_lines(
    port: Box<dyn serialport::SerialPort>,
    tx: mpsc::UnboundedSender<String>,
    stop: Arc<AtomicBool>,
    port_name: String,
) {
    let mut reader = BufReader::new(port);
    let mut buf = Vec::new();

    while !stop.load(Ordering::Relaxed) {
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) if buf.ends_with(b"\n") => {
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                buf.clear();
                if line.is_empty() {
                    continue;
                }
                tracing::trace!("<< {}", line);
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => {
                tracing::error!("Serial read failed on {}: {}", port_name, e);
                break;
            }
        }
    }

    tracing::debug!("Serial reader for {} stopped", port_name);
}

#[async_trait]
impl ControllerChannel for SerialLink {
    async fn send_line(&mut self, line: &str) -> Result<(), ProbeError> {
        tracing::trace!(">> {}", line);
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.writer
            .write_all(&data)
            .and_then(|_| self.writer.flush())
            .map_err(|e| match e.kind() {
                io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => {
                    ProbeError::ConnectionLost
                }
                _ => ProbeError::Io {
                    reason: e.to_string(),
                },
            })
    }

    async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    fn free_move_feedrate(&self) -> Option<f64> {
        self.settings
            .get(&FREE_MOVE_FEEDRATE_SETTING)
            .and_then(|value| value.parse::<f64>().ok())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}
