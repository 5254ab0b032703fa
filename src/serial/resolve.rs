//! Port selection
//!
//! Turns an optional `--port` value, or an interactive answer picked from the
//! enumerated devices, into the single port name that gets opened.

use crate::error::{ProbeError, ProbeResult};
use crate::serial::port::PortDescriptor;
use crate::serial::{prompt, report};
use log::debug;
use std::io::{BufRead, Write};

/// How an interactive answer maps onto the enumerated ports
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    /// A port that appears in the enumerated list
    Listed(String),
    /// A name the OS did not report; it is still opened
    Unlisted(String),
}

impl Choice {
    pub fn name(&self) -> &str {
        match self {
            Choice::Listed(name) | Choice::Unlisted(name) => name,
        }
    }
}

/// Interpret one line of user input against the displayed list.
///
/// A number in `1..=ports.len()` picks that entry. Anything else, including
/// an out-of-range number, is taken as a literal port name.
pub fn interpret_choice(ports: &[PortDescriptor], input: &str) -> Choice {
    let input = input.trim();

    if let Ok(index) = input.parse::<usize>() {
        if (1..=ports.len()).contains(&index) {
            return Choice::Listed(ports[index - 1].name.clone());
        }
    }

    if ports.iter().any(|p| p.name == input) {
        Choice::Listed(input.to_string())
    } else {
        Choice::Unlisted(input.to_string())
    }
}

/// Resolve the port to open.
///
/// A non-empty `explicit` name is used verbatim and `enumerate` is never
/// called. Otherwise the ports are listed on `out` and one line is read from
/// `input`.
pub fn resolve_port<E, R, W>(
    explicit: Option<&str>,
    enumerate: E,
    input: &mut R,
    out: &mut W,
) -> ProbeResult<String>
where
    E: FnOnce() -> ProbeResult<Vec<PortDescriptor>>,
    R: BufRead,
    W: Write,
{
    if let Some(name) = explicit.filter(|name| !name.is_empty()) {
        debug!("Using port given on the command line: {}", name);
        return Ok(name.to_string());
    }

    report(out, format_args!("Skanowanie dostępnych portów szeregowych..."));
    let ports = enumerate()?;
    if ports.is_empty() {
        return Err(ProbeError::NoPorts);
    }

    report(out, format_args!("\nDostępne porty szeregowe:"));
    for (i, port) in ports.iter().enumerate() {
        report(out, format_args!("{}. {}", i + 1, port));
    }
    prompt(
        out,
        format_args!(
            "Wybierz numer portu (1-{}) lub wpisz nazwę portu ręcznie: ",
            ports.len()
        ),
    );

    // Whatever bytes were typed are the answer; only a failing stdin is fatal.
    let mut raw = Vec::new();
    input.read_until(b'\n', &mut raw).map_err(ProbeError::Prompt)?;
    let line = String::from_utf8_lossy(&raw);

    let choice = interpret_choice(&ports, &line);
    debug!("Interpreted {:?} as {:?}", line.trim(), choice);

    if let Choice::Unlisted(ref name) = choice {
        report(
            out,
            format_args!(
                "Ostrzeżenie: Podana nazwa portu '{}' nie znajduje się na liście wykrytych portów. \
                 Mimo to spróbuję otworzyć.",
                name
            ),
        );
    }

    if choice.name().is_empty() {
        return Err(ProbeError::NoPortSelected);
    }

    Ok(choice.name().to_string())
}
