//! axsync CLI - encrypt-at-rest wrapper around a sync tool's phases
//!
//! Invoked by the sync tool's job automation:
//!
//! ```text
//! axsync PA "my passphrase" /path/to/dir -m     # before analysis: encrypt
//! axsync PS "my passphrase" /path/to/dir -m     # after sync: decrypt
//! ```
//!
//! All argument validation happens here, before any filesystem or external
//! process side effect. Runtime failures are reported once, as a banner,
//! and the process exits non-zero.

use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use axsync::config::{Encrypter, Phase, RecursionMode};
use axsync::error::Result;
use axsync::passphrase::{ConstantPassphraseReader, PassphraseReader, TerminalPassphraseReader};
use axsync::runner::{self, RunConfig};

#[derive(Parser)]
#[command(name = "axsync")]
#[command(version)]
#[command(about = "Keeps a directory encrypted at rest around sync phases.", long_about = None)]
struct Cli {
    /// Sync phase: PA (pre-analysis, encrypt) or PS (post-sync, decrypt)
    #[arg(value_name = "PHASE", value_parser = parse_phase)]
    phase: Phase,

    /// Encryption passphrase; pass "-" to be prompted without echo
    #[arg(value_name = "PASSPHRASE")]
    passphrase: String,

    /// Root directory, without trailing separator
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Recursion token: -m to descend into subdirectories, omit otherwise
    #[arg(value_name = "RECURSION", allow_hyphen_values = true)]
    recursion: Option<String>,

    /// Only consider files matching this glob (repeatable; default: all)
    #[arg(long = "include", value_name = "GLOB")]
    include: Vec<String>,

    /// Skip files and directories matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,
}

fn parse_phase(token: &str) -> std::result::Result<Phase, String> {
    token.parse()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mode = match RecursionMode::from_flag(cli.recursion.as_deref()) {
        Ok(mode) => mode,
        Err(msg) => Cli::command()
            .error(clap::error::ErrorKind::InvalidValue, msg)
            .exit(),
    };

    let config = RunConfig {
        phase: cli.phase,
        root: cli.directory,
        mode,
        includes: cli.include,
        excludes: cli.exclude,
    };

    if let Err(err) = execute(&config, &cli.passphrase) {
        eprintln!("===========================");
        eprintln!("axsync failed: {err}");
        let mut cause: Option<&dyn std::error::Error> =
            err.source_error().map(|s| s as &dyn std::error::Error);
        while let Some(source) = cause {
            eprintln!("  caused by: {source}");
            cause = source.source();
        }
        eprintln!("===========================");
        process::exit(1);
    }
}

fn execute(config: &RunConfig, passphrase_arg: &str) -> Result<()> {
    let mut reader: Box<dyn PassphraseReader> = if passphrase_arg == "-" {
        Box::new(TerminalPassphraseReader::new())
    } else {
        Box::new(ConstantPassphraseReader::new(passphrase_arg.to_string()))
    };
    let passphrase = reader.read_passphrase()?;

    let encrypter = Encrypter::from_env()?;
    runner::run(config, &encrypter, &passphrase)
}
