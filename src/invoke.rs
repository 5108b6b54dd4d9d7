//! External encrypter invocation
//!
//! One blocking spawn per file, strictly sequential, no timeout. The flag
//! templates mirror the vendor's command line exactly:
//!
//! - encrypt:  `-b 2 -e -k <passphrase> [-m] -z <file>`
//! - decrypt:  `-b 2 -k <passphrase> [-m] -f -d <file> -t`
//! - shutdown: `-x` (asks the resident encrypter process to exit)
//!
//! A spawn failure (missing or non-executable binary) is an error. A child
//! that runs but exits non-zero is NOT: the encrypter does not document its
//! exit codes and the workflow has always tolerated per-file failures, so
//! the status is only surfaced in the log.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::config::{Encrypter, RecursionMode};
use crate::error::{AxsyncError, ErrorCategory, ErrorKind, Result};

/// Invokes the encrypter with a fixed passphrase and recursion mode.
pub struct Invoker<'a> {
    encrypter: &'a Encrypter,
    passphrase: &'a str,
    mode: RecursionMode,
}

impl<'a> Invoker<'a> {
    pub fn new(encrypter: &'a Encrypter, passphrase: &'a str, mode: RecursionMode) -> Self {
        Self {
            encrypter,
            passphrase,
            mode,
        }
    }

    /// Encrypts one file in place; the original is deleted by the
    /// encrypter (`-z`).
    pub fn encrypt(&self, file: &Path) -> Result<()> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("-b"),
            OsStr::new("2"),
            OsStr::new("-e"),
            OsStr::new("-k"),
            OsStr::new(self.passphrase),
        ];
        self.push_recursion_flag(&mut args);
        args.push(OsStr::new("-z"));
        args.push(file.as_os_str());
        self.run(&args)
    }

    /// Decrypts one file in place, forcing overwrite (`-f`) and wiping the
    /// encrypter's temp files (`-t`).
    pub fn decrypt(&self, file: &Path) -> Result<()> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("-b"),
            OsStr::new("2"),
            OsStr::new("-k"),
            OsStr::new(self.passphrase),
        ];
        self.push_recursion_flag(&mut args);
        args.push(OsStr::new("-f"));
        args.push(OsStr::new("-d"));
        args.push(file.as_os_str());
        args.push(OsStr::new("-t"));
        self.run(&args)
    }

    /// Asks the encrypter's resident process to terminate itself. Issued
    /// once, after the decrypt phase has processed every file.
    pub fn terminate_resident(&self) -> Result<()> {
        self.run(&[OsStr::new("-x")])
    }

    fn push_recursion_flag(&self, args: &mut Vec<&OsStr>) {
        if self.mode == RecursionMode::IncludeSubdirectories {
            args.push(OsStr::new("-m"));
        }
    }

    fn run(&self, args: &[&OsStr]) -> Result<()> {
        let exe = self.encrypter.exe();
        log::debug!("spawning {}", exe.display());
        let status = Command::new(exe).args(args).status().map_err(|e| {
            AxsyncError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::SpawnFailed,
                format!("failed to spawn encrypter {}", exe.display()),
                e,
            )
        })?;
        if !status.success() {
            log::warn!("encrypter exited with {status}; continuing");
        }
        Ok(())
    }
}
