//! Serial port configuration, discovery and connection
//!
//! Wraps `serialport` with the fixed 8/N/1 framing used by the probe.

use crate::error::{ProbeError, ProbeResult};
use colored::Colorize;
use log::debug;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Baud rate used when none is given on the command line
pub const DEFAULT_BAUD: u32 = 9600;

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyUSB0, COM3)
    pub port_path: String,
    /// Baud rate (default: 9600)
    pub baud_rate: u32,
    /// Data bits (always 8)
    pub data_bits: DataBits,
    /// Parity (always none)
    pub parity: Parity,
    /// Stop bits (always 1)
    pub stop_bits: StopBits,
    /// Flow control (none)
    pub flow_control: FlowControl,
    /// Per-read driver timeout. Zero makes a read return at once when nothing is pending.
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::new(),
            baud_rate: DEFAULT_BAUD,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::ZERO,
        }
    }
}

impl PortConfig {
    /// Create a new 8/N/1 configuration for the given port
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// An open serial port. The device is closed when this is dropped.
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
    config: PortConfig,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> ProbeResult<Self> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|source| ProbeError::Open {
                port: config.port_path.clone(),
                source,
            })?;

        debug!("Opened {} with {:?}", config.port_path, config);
        Ok(Self { port, config })
    }
}

/// Map an expired driver timeout to "no data yet" (`Ok(0)`)
fn pending(result: io::Result<usize>) -> io::Result<usize> {
    match result {
        Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
            Ok(0)
        }
        other => other,
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        pending(self.port.read(buf))
    }
}

impl Write for SerialConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialConnection {
    fn drop(&mut self) {
        debug!("Closing serial port {}", self.config.port_path);
    }
}

/// USB descriptor strings reported for a USB-attached port
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsbInfo {
    pub vid: u16,
    pub pid: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// A serial device found by enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct PortDescriptor {
    pub name: String,
    pub usb: Option<UsbInfo>,
}

impl PortDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            usb: None,
        }
    }

    pub fn with_usb(mut self, usb: UsbInfo) -> Self {
        self.usb = Some(usb);
        self
    }
}

impl From<serialport::SerialPortInfo> for PortDescriptor {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let descriptor = PortDescriptor::new(&info.port_name);

        match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => descriptor.with_usb(UsbInfo {
                vid: usb.vid,
                pid: usb.pid,
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
                product: usb.product,
            }),
            serialport::SerialPortType::PciPort
            | serialport::SerialPortType::BluetoothPort
            | serialport::SerialPortType::Unknown => descriptor,
        }
    }
}

impl fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref usb) = self.usb {
            write!(
                f,
                " (USB VID:{:04x} PID:{:04x} Serial:{} Product:{})",
                usb.vid,
                usb.pid,
                usb.serial_number.as_deref().unwrap_or(""),
                usb.product.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

/// List all serial ports visible to the OS, ordered by name
pub fn list_ports() -> ProbeResult<Vec<PortDescriptor>> {
    let ports = serialport::available_ports().map_err(ProbeError::Enumerate)?;

    let mut descriptors: Vec<PortDescriptor> =
        ports.into_iter().map(PortDescriptor::from).collect();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("Enumerated {} serial port(s)", descriptors.len());
    Ok(descriptors)
}

/// Print formatted list of available serial ports
pub fn print_ports() -> ProbeResult<()> {
    let ports = list_ports()?;

    if ports.is_empty() {
        println!("{}", "Nie znaleziono żadnych portów szeregowych".yellow());
        println!("\n{}", "Wskazówki:".cyan().bold());
        println!("  1. Podłącz adapter USB-UART lub płytkę PMOD");
        println!("  2. Sprawdź, czy urządzenie jest widoczne: ls -la /dev/ttyUSB* /dev/ttyACM*");
        println!("  3. Dodaj użytkownika do grupy 'dialout': sudo usermod -aG dialout $USER");
        return Ok(());
    }

    println!("{}", "Dostępne porty szeregowe:".green().bold());
    for (i, port) in ports.iter().enumerate() {
        println!("  {}. {}", i + 1, port.to_string().white());
        if let Some(mfg) = port.usb.as_ref().and_then(|usb| usb.manufacturer.as_deref()) {
            println!("     Producent: {}", mfg);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftdi() -> UsbInfo {
        UsbInfo {
            vid: 0x0403,
            pid: 0x6010,
            serial_number: Some("210249A0B1C2".to_string()),
            manufacturer: Some("Digilent".to_string()),
            product: Some("Digilent USB Device".to_string()),
        }
    }

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.timeout, Duration::ZERO);
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyACM0").with_baud_rate(115200);

        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.flow_control, FlowControl::None);
    }

    #[test]
    fn test_display_plain_port() {
        assert_eq!(PortDescriptor::new("/dev/ttyS0").to_string(), "/dev/ttyS0");
    }

    #[test]
    fn test_display_usb_port() {
        let port = PortDescriptor::new("/dev/ttyUSB1").with_usb(ftdi());
        assert_eq!(
            port.to_string(),
            "/dev/ttyUSB1 (USB VID:0403 PID:6010 Serial:210249A0B1C2 Product:Digilent USB Device)"
        );
    }

    #[test]
    fn test_display_usb_port_without_strings() {
        let usb = UsbInfo {
            vid: 0x1a86,
            pid: 0x7523,
            ..Default::default()
        };
        let port = PortDescriptor::new("COM4").with_usb(usb);
        assert_eq!(port.to_string(), "COM4 (USB VID:1a86 PID:7523 Serial: Product:)");
    }

    #[test]
    fn test_from_serialport_info() {
        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: serialport::SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x0403,
                pid: 0x6010,
                serial_number: None,
                manufacturer: None,
                product: Some("Dual RS232-HS".to_string()),
            }),
        };
        let port = PortDescriptor::from(info);
        assert_eq!(port.name, "/dev/ttyUSB0");
        assert_eq!(port.usb.as_ref().map(|u| u.vid), Some(0x0403));

        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: serialport::SerialPortType::PciPort,
        };
        assert_eq!(PortDescriptor::from(info).usb, None);
    }

    #[test]
    fn test_timeout_means_no_data_yet() {
        let timed_out = io::Error::new(io::ErrorKind::TimedOut, "Operation timed out");
        assert_eq!(pending(Err(timed_out)).unwrap(), 0);

        let would_block = io::Error::new(io::ErrorKind::WouldBlock, "try again");
        assert_eq!(pending(Err(would_block)).unwrap(), 0);

        assert_eq!(pending(Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_other_read_errors_pass_through() {
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged");
        let err = pending(Err(err)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
