//! Phase orchestration
//!
//! One run is Snapshot → Transform → Transcode → Restore, branching on the
//! phase. There is no partial-success bookkeeping: the first unhandled
//! error aborts the run, and an interrupted run can leave the directory in
//! a mixed plaintext/encrypted state with timestamps unrestored.

use std::path::PathBuf;

use crate::config::{Encrypter, Phase, RecursionMode};
use crate::error::Result;
use crate::invoke::Invoker;
use crate::timestamps;
use crate::transcode;
use crate::walk::{self, PathFilter};

/// Everything a single run needs, validated up front by the CLI.
#[derive(Debug)]
pub struct RunConfig {
    pub phase: Phase,
    pub root: PathBuf,
    pub mode: RecursionMode,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Executes one phase over the directory.
pub fn run(config: &RunConfig, encrypter: &Encrypter, passphrase: &str) -> Result<()> {
    let filter = PathFilter::new(&config.includes, &config.excludes)?;
    let files = walk::collect_files(&config.root, config.mode, &filter)
        .map_err(|e| e.with_context(format!("failed to enumerate {}", config.root.display())))?;
    log::info!(
        "{:?} over {}: {} file(s)",
        config.phase,
        config.root.display(),
        files.len()
    );

    let map = timestamps::snapshot(&files)?;
    let invoker = Invoker::new(encrypter, passphrase, config.mode);

    match config.phase {
        Phase::PreAnalysis => {
            for path in map.keys() {
                log::debug!("encrypting {}", path.display());
                invoker.encrypt(path)?;
            }
        }
        Phase::PostSync => {
            for path in map.keys() {
                log::debug!("decrypting {}", path.display());
                invoker.decrypt(path)?;
            }
            invoker.terminate_resident()?;
        }
    }

    let transcoded = transcode::transcode_map(map, config.phase);
    timestamps::restore(&transcoded)?;
    log::info!("{:?} complete", config.phase);
    Ok(())
}
