//! Passphrase acquisition
//!
//! The sync tool normally passes the passphrase as a positional argument,
//! but interactive runs can hand over `-` instead to be prompted on the
//! terminal without echo. Either way the passphrase lives in `Zeroizing`
//! storage so it is wiped when the run ends; it still crosses a process
//! boundary as an encrypter argument, which is inherent to the vendor's
//! command-line contract.

use std::io::{self, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::error::{AxsyncError, ErrorCategory, ErrorKind, Result};

/// Trait for reading passphrases from various sources.
pub trait PassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed passphrase (the positional CLI argument, or tests).
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<String>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: String) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new((*self.passphrase).clone()))
    }
}

/// Reads the passphrase from the terminal with no echo.
pub struct TerminalPassphraseReader;

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(AxsyncError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot prompt for passphrase - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(b"Passphrase (axsync): ")
            .and_then(|()| io::stderr().flush())
            .map_err(|e| {
                AxsyncError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {e}"),
                    e,
                )
            })?;

        // Read without echo; rpassword hands back a plain String.
        let passphrase = rpassword::read_password().map_err(|e| {
            AxsyncError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                format!("failure reading passphrase: {e}"),
                e,
            )
        })?;

        Ok(Zeroizing::new(passphrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_reader() {
        let mut reader = ConstantPassphraseReader::new("test123".to_string());
        assert_eq!(&*reader.read_passphrase().unwrap(), "test123");
        assert_eq!(&*reader.read_passphrase().unwrap(), "test123");
    }

    /// Tests the terminal reader. This is ignored by default and must be run
    /// explicitly and with human input:
    ///
    /// cargo test test_terminal_reader_interactive -- --ignored --nocapture
    #[test]
    #[ignore]
    fn test_terminal_reader_interactive() {
        let mut reader = TerminalPassphraseReader::new();
        println!("\nPlease enter a test passphrase:");
        let passphrase = reader.read_passphrase().unwrap();
        println!("You entered: {}", &*passphrase);
        assert!(!passphrase.is_empty(), "Expected non-empty passphrase");
    }
}
