//! Run parameters and encrypter resolution
//!
//! Everything that used to be ambient in the original batch-script workflow
//! (the encrypter's install location, the fixed flag strings, the phase and
//! recursion tokens) is resolved here once at startup and passed down
//! explicitly.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AxsyncError, ErrorCategory};

/// Marker prepended to a filename's final segment once it is encrypted.
pub const ENCRYPTED_MARKER: &str = ".axx";

/// The sync tool's metadata directory; never traversed, never transformed.
pub const RESERVED_DIR: &str = "_gsdata_";

/// Environment variable naming the encrypter executable directly.
pub const ENCRYPTER_ENV: &str = "AXSYNC_ENCRYPTER";

/// Fallback: install directory variable plus the vendor's fixed subpath.
const INSTALL_DIR_ENV: &str = "ProgramFiles";
const INSTALL_SUBPATH: &str = "Axantum/AxCrypt/AxCrypt.exe";

/// Which lifecycle stage of the sync workflow triggered this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the sync tool analyzes the directory: encrypt everything.
    PreAnalysis,
    /// After the sync has completed: decrypt everything back.
    PostSync,
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PA" => Ok(Phase::PreAnalysis),
            "PS" => Ok(Phase::PostSync),
            other => Err(format!(
                "unrecognized phase {other:?}: use PA (pre-analysis, encrypt) or PS (post-sync, decrypt)"
            )),
        }
    }
}

/// Whether the run touches subdirectories or only the root itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionMode {
    ThisDirectoryOnly,
    IncludeSubdirectories,
}

impl RecursionMode {
    /// Parses the trailing CLI token: absent/empty means no recursion, `-m`
    /// means recurse. Anything else is a usage error.
    pub fn from_flag(flag: Option<&str>) -> Result<Self, String> {
        match flag {
            None | Some("") => Ok(RecursionMode::ThisDirectoryOnly),
            Some("-m") => Ok(RecursionMode::IncludeSubdirectories),
            Some(other) => Err(format!(
                "unrecognized recursion token {other:?}: use -m to recurse, or omit it"
            )),
        }
    }
}

/// The external encrypter executable, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Encrypter {
    exe: PathBuf,
}

impl Encrypter {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Resolves the executable from the environment: `AXSYNC_ENCRYPTER` if
    /// set, otherwise the vendor's fixed subpath under the install
    /// directory variable.
    pub fn from_env() -> crate::error::Result<Self> {
        Self::resolve(env::var_os(ENCRYPTER_ENV), env::var_os(INSTALL_DIR_ENV))
    }

    fn resolve(
        override_path: Option<OsString>,
        install_dir: Option<OsString>,
    ) -> crate::error::Result<Self> {
        if let Some(exe) = override_path {
            return Ok(Self::new(PathBuf::from(exe)));
        }
        match install_dir {
            Some(dir) => Ok(Self::new(PathBuf::from(dir).join(INSTALL_SUBPATH))),
            None => Err(AxsyncError::new(
                ErrorCategory::User,
                format!(
                    "cannot locate the encrypter: neither {ENCRYPTER_ENV} nor {INSTALL_DIR_ENV} is set"
                ),
            )),
        }
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }
}
