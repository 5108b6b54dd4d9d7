//! axsync - keeps a directory encrypted at rest around a sync tool's phases
//!
//! The sync tool calls this program twice per job: once before it analyzes
//! the directory (encrypt everything in place) and once after the sync has
//! completed (decrypt everything back). The actual encryption is delegated
//! to an external AxCrypt-style executable invoked once per file; this crate
//! contributes the directory walk, the filename transcoding between
//! plaintext and encrypted-extension forms, and the preservation of each
//! file's access/modification timestamps across the transform.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod invoke;
pub mod passphrase;
pub mod runner;
pub mod timestamps;
pub mod transcode;
pub mod walk;
