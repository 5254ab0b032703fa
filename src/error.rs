//! Fatal conditions of a probe run
//!
//! Every variant aborts the run. A reply that never arrives is not an error
//! and is reported through [`crate::serial::Outcome::Silent`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Błąd podczas listowania portów: {0}")]
    Enumerate(#[source] serialport::Error),

    #[error("Nie znaleziono żadnych portów szeregowych! Upewnij się, że PMOD jest podłączony.")]
    NoPorts,

    #[error("Błąd podczas odczytu wyboru portu: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Nie wybrano portu. Program zostanie zakończony.")]
    NoPortSelected,

    #[error(
        "Błąd podczas otwierania portu {port}: {source}\n\
         Upewnij się, że nazwa portu jest poprawna i masz do niego uprawnienia."
    )]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Błąd podczas wysyłania danych: {0}")]
    Write(#[source] std::io::Error),

    #[error("Błąd podczas odczytu danych: {0}")]
    Read(#[source] std::io::Error),
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
