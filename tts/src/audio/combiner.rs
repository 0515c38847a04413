//! Audio file combination using FFmpeg.

use crate::dispatch::Ledger;
use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs FFmpeg's concat demuxer over a manifest.
#[derive(Debug, Clone)]
pub struct Combiner {
    program: PathBuf,
}

impl Combiner {
    /// Find FFmpeg on PATH.
    ///
    /// Called before any chunk is sent so a missing tool costs no API calls.
    pub fn locate() -> Result<Self> {
        let program = which::which("ffmpeg")
            .context("ffmpeg is not installed or not found in PATH")?;
        log::debug!("Using ffmpeg at {}", program.display());
        Ok(Self { program })
    }

    /// Use a specific executable in place of FFmpeg.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Concatenate the manifest's entries into `output` without re-encoding.
    ///
    /// On success every file in `ledger` is deleted and the outcome reported;
    /// on failure nothing is deleted.
    pub fn combine(&self, manifest: &Path, output: &Path, ledger: &Ledger) -> Result<CleanupReport> {
        let result = Command::new(&self.program)
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .context("Error combining audio files: failed to run ffmpeg")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("Error combining audio files: ffmpeg concat failed: {}", stderr.trim());
        }

        log::info!("Combined {} into {}", manifest.display(), output.display());

        Ok(cleanup_files(ledger.files()))
    }
}

/// Outcome of best-effort deletion of intermediate files.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete every file, collecting failures instead of stopping at the first.
pub fn cleanup_files(files: &[PathBuf]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for file in files {
        log::debug!("Deleting file: {}", file.display());
        match std::fs::remove_file(file) {
            Ok(()) => report.removed.push(file.clone()),
            Err(e) => {
                log::warn!("Error deleting file {}: {}", file.display(), e);
                report.failures.push((file.clone(), e));
            }
        }
    }

    report
}
