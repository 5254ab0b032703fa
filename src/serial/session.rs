//! Request/response exchange with the attached device
//!
//! Writes the message once, waits for the device to settle, then polls for a
//! reply a bounded number of times. Only "no bytes yet" is retried; any I/O
//! error ends the run.

use crate::error::{ProbeError, ProbeResult};
use crate::serial::port::PortConfig;
use crate::serial::report;
use colored::Colorize;
use log::debug;
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

/// Timing of the read phase
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between the write and the first read
    pub settle: Duration,
    /// Pause after every read that returned nothing
    pub interval: Duration,
    /// Number of reads before giving up
    pub attempts: u32,
    /// Size of the buffer handed to each read
    pub buffer_size: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            interval: Duration::from_millis(500),
            attempts: 10,
            buffer_size: 100,
        }
    }
}

impl PollConfig {
    /// Total time spent polling after the settle delay, capped at `Duration::MAX`
    pub fn window(&self) -> Duration {
        self.interval.saturating_mul(self.attempts)
    }
}

/// Result of the read phase
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Bytes returned by the first non-empty read
    Received(Vec<u8>),
    /// Every attempt came back empty
    Silent,
}

/// Write `message` to `channel` and wait for a reply.
pub fn exchange<C, W>(
    channel: &mut C,
    message: &[u8],
    poll: &PollConfig,
    out: &mut W,
) -> ProbeResult<Outcome>
where
    C: Read + Write,
    W: Write,
{
    let written = channel.write(message).map_err(ProbeError::Write)?;
    channel.flush().map_err(ProbeError::Write)?;
    report(
        out,
        format_args!(
            "{} Wysłano {} bajtów: \"{}\"",
            "[TX]".cyan().bold(),
            written,
            String::from_utf8_lossy(message)
        ),
    );

    thread::sleep(poll.settle);

    report(
        out,
        format_args!(
            "Oczekiwanie na dane z PMOD (max {} sekund)...",
            poll.window().as_secs_f64()
        ),
    );

    let mut buffer = vec![0u8; poll.buffer_size];
    for attempt in 1..=poll.attempts {
        let n = channel.read(&mut buffer).map_err(ProbeError::Read)?;
        debug!("Read attempt {}/{}: {} byte(s)", attempt, poll.attempts, n);

        if n > 0 {
            let data = buffer[..n].to_vec();
            report(
                out,
                format_args!(
                    "{} Odebrano {} bajtów: \"{}\"",
                    "[RX]".green().bold(),
                    n,
                    String::from_utf8_lossy(&data)
                ),
            );
            return Ok(Outcome::Received(data));
        }

        thread::sleep(poll.interval);
    }

    report(
        out,
        format_args!("{}", "Nie odebrano danych w określonym czasie.".yellow()),
    );
    Ok(Outcome::Silent)
}

/// Open the port through `open` and run [`exchange`] on it.
///
/// The connection lives only inside this call, so it is closed on every
/// path out, including errors from the write or read phase.
pub fn probe<C, F, W>(
    config: PortConfig,
    open: F,
    message: &[u8],
    poll: &PollConfig,
    out: &mut W,
) -> ProbeResult<Outcome>
where
    C: Read + Write,
    F: FnOnce(PortConfig) -> ProbeResult<C>,
    W: Write,
{
    let port_path = config.port_path.clone();
    let baud_rate = config.baud_rate;

    let mut channel = open(config)?;
    report(
        out,
        format_args!(
            "{} Pomyślnie otwarto port szeregowy {} z prędkością {} baud.",
            "[OK]".green().bold(),
            port_path,
            baud_rate
        ),
    );

    exchange(&mut channel, message, poll, out)
}
