//! PMOD Probe
//!
//! Checks that a serial-attached peripheral (an FPGA board behind a PMOD
//! USB-UART, for instance) is reachable: opens the port at 8/N/1, sends a
//! short message and waits a few seconds for the device to answer.
//!
//! # Usage
//!
//! ```bash
//! # Pick the port from a numbered list, send the default greeting at 9600 baud
//! pmod-probe
//!
//! # Explicit port, faster link, custom message
//! pmod-probe --port /dev/ttyUSB1 --baud 115200 --msg $'PING\n'
//!
//! # Only list the detected ports
//! pmod-probe --list
//! ```

mod error;
mod serial;

use anyhow::Result;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use colored::Colorize;
use log::debug;
use std::io;
use std::time::Duration;

use serial::port::{list_ports, print_ports, DEFAULT_BAUD};
use serial::{probe, resolve_port, Outcome, PollConfig, PortConfig, SerialConnection};

/// PMOD Probe
///
/// Send a message over a serial port and wait for the reply
#[derive(Parser, Debug)]
#[command(name = "pmod-probe")]
#[command(author = "Prasanna Gautam")]
#[command(version = "0.1.0")]
#[command(about = "Send a message over a serial port and wait for the reply")]
struct Cli {
    /// Serial port name (e.g. /dev/ttyUSB0, COM1). If empty, a list is shown to choose from.
    #[arg(short, long, default_value = "")]
    port: String,

    /// Baud rate, e.g. 9600, 115200
    #[arg(short, long, default_value_t = DEFAULT_BAUD, value_parser = clap::value_parser!(u32).range(1..))]
    baud: u32,

    /// Message sent through the serial port
    #[arg(short, long, default_value = "Witaj PMOD!\n")]
    msg: String,

    /// List available serial ports and exit
    #[arg(short, long)]
    list: bool,

    /// Number of read attempts while waiting for the reply
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    attempts: u32,

    /// Pause after an empty read, in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Pause between sending and the first read, in milliseconds
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,

    /// Size of the read buffer in bytes
    #[arg(long, default_value_t = 100, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    buffer_size: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn poll_config(&self) -> PollConfig {
        PollConfig {
            settle: Duration::from_millis(self.settle_ms),
            interval: Duration::from_millis(self.interval_ms),
            attempts: self.attempts,
            buffer_size: self.buffer_size,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if cli.list {
        print_ports()?;
        return Ok(());
    }

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let poll = cli.poll_config();
    debug!("{:?}", poll);

    let mut out = io::stdout();
    let port_name = resolve_port(Some(cli.port.as_str()), list_ports, &mut io::stdin().lock(), &mut out)?;

    println!("Wybrany port: {}", port_name.white().bold());

    let config = PortConfig::new(&port_name).with_baud_rate(cli.baud);
    let outcome = probe(config, SerialConnection::open, cli.msg.as_bytes(), &poll, &mut out)?;

    if let Outcome::Received(ref bytes) = outcome {
        debug!("Reply bytes: {:02x?}", bytes);
    }

    println!("Program zakończony.");
    Ok(())
}
