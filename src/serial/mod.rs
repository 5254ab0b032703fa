//! Serial port handling for the probe
//!
//! This module provides functionality for:
//! - Listing available serial ports with their USB descriptors
//! - Choosing the port to talk to, interactively or from the command line
//! - Sending a message and polling for the device's reply

pub mod port;
pub mod resolve;
pub mod session;

use log::debug;
use std::fmt;
use std::io::Write;

pub use port::{PortConfig, SerialConnection};
pub use resolve::resolve_port;
pub use session::{probe, Outcome, PollConfig};

/// Write one progress line. Output is best effort: a closed stdout must not
/// abort the run, so failures are only logged.
pub(crate) fn report<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        debug!("Failed to write progress line: {}", e);
    }
}

/// Write a prompt without a line break and flush it, best effort like [`report`].
pub(crate) fn prompt<W: Write>(out: &mut W, text: fmt::Arguments<'_>) {
    if let Err(e) = write!(out, "{}", text).and_then(|_| out.flush()) {
        debug!("Failed to write prompt: {}", e);
    }
}
