//! One full run: read, chunk, confirm, dispatch, combine.

use crate::audio::{CleanupReport, Combiner};
use crate::dispatch::{Dispatcher, Ledger, OutputPlan};
use crate::job::JobConfig;
use crate::text::chunk_text;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use speech_client::SpeechClient;
use std::path::{Path, PathBuf};

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum RunOutcome {
    /// The input had no text
    Empty,
    /// The user declined the multi-file prompt; no files were created
    Cancelled,
    /// Every chunk was synthesized
    Completed {
        artifacts: Vec<PathBuf>,
        /// Present when artifacts were combined
        combined: Option<CleanupReport>,
    },
}

/// Run the whole pipeline for `job`.
///
/// `confirm` is asked before dispatching more than one chunk. `combiner` must
/// be supplied when the job combines files, and should be located before
/// calling so a missing tool is caught up front.
pub async fn run<C>(
    job: &JobConfig,
    client: &SpeechClient,
    combiner: Option<&Combiner>,
    confirm: C,
) -> Result<RunOutcome>
where
    C: FnOnce(usize) -> Result<bool>,
{
    let text = tokio::fs::read_to_string(&job.input)
        .await
        .with_context(|| format!("Error reading input file {}", job.input.display()))?;

    let chunks = chunk_text(&text, job.max_chunk_size, job.buffer_text)?;
    if chunks.is_empty() {
        log::warn!("{} is empty, nothing to synthesize", job.input.display());
        return Ok(RunOutcome::Empty);
    }

    let plan = job.plan(chunks.len());
    check_collisions(job, &plan, chunks.len())?;

    if plan.writes_manifest() && combiner.is_none() {
        anyhow::bail!("ffmpeg is required to combine files");
    }

    if plan.is_multi_file() && !confirm(chunks.len())? {
        log::info!("Operation cancelled.");
        return Ok(RunOutcome::Cancelled);
    }

    log::info!(
        "Processing {} chunk(s) from {}",
        chunks.len(),
        job.input.display()
    );

    let pb = if plan.is_multi_file() {
        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut ledger = Ledger::new();
    let result = Dispatcher::new(client, job)
        .process(&chunks, &mut ledger, |_| pb.inc(1))
        .await;
    pb.finish_and_clear();

    let artifacts = match result {
        Ok(artifacts) => artifacts,
        Err(e) => {
            report_kept_files(&ledger);
            return Err(e);
        }
    };

    let combined = match combiner {
        Some(combiner) if plan.writes_manifest() => {
            let report = combiner
                .combine(&plan.manifest_path(), &job.output, &ledger)
                .inspect_err(|_| report_kept_files(&ledger))?;
            if !report.is_clean() {
                log::warn!(
                    "{} intermediate file(s) could not be deleted",
                    report.failures.len()
                );
            }
            Some(report)
        }
        _ => None,
    };

    Ok(RunOutcome::Completed {
        artifacts,
        combined,
    })
}

/// Refuse a plan that would write over the input, or a manifest that would
/// clobber the combined output.
fn check_collisions(job: &JobConfig, plan: &OutputPlan, chunk_count: usize) -> Result<()> {
    let input = resolve(&job.input);

    let mut created: Vec<PathBuf> = (0..chunk_count).map(|i| plan.destination(i)).collect();
    if plan.writes_manifest() {
        let manifest = plan.manifest_path();
        if resolve(&manifest) == resolve(&job.output) {
            anyhow::bail!(
                "Manifest {} would overwrite the output file; choose a different output name",
                manifest.display()
            );
        }
        created.push(manifest);
    }

    if let Some(clash) = created.iter().find(|p| resolve(p) == input) {
        anyhow::bail!(
            "{} would overwrite the input file {}; choose a different output name",
            clash.display(),
            job.input.display()
        );
    }

    Ok(())
}

/// Absolute form of `path`, resolving the parent when the file does not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (std::fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn report_kept_files(ledger: &Ledger) {
    if ledger.is_empty() {
        return;
    }
    log::warn!("Keeping {} file(s) created before the failure:", ledger.len());
    for file in ledger.files() {
        log::warn!("  {}", file.display());
    }
}
