//! mp3concat - Check a set of MP3 files before joining them
//!
//! Only argument validation is performed; no audio is read or written.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Fewest files worth concatenating
const MIN_FILES: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "mp3concat", about = "Concatenate MP3 files", long_about = None)]
#[command(version)]
struct Args {
    /// MP3 files to concatenate, in order
    files: Vec<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    validate(&args.files)?;
    log::debug!("{} files validated", args.files.len());

    Ok(())
}

/// Every file must carry an `.mp3` extension and there must be enough of them.
fn validate(files: &[PathBuf]) -> Result<()> {
    if let Some(bad) = files
        .iter()
        .find(|f| f.extension() != Some(OsStr::new("mp3")))
    {
        anyhow::bail!("All files must end with .mp3 (got {})", bad.display());
    }

    if files.len() < MIN_FILES {
        anyhow::bail!(
            "Not enough files to concat: need at least {}, got {}",
            MIN_FILES,
            files.len()
        );
    }

    Ok(())
}
