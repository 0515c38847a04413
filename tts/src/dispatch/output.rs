//! Naming of artifact and manifest files derived from the output path.

use speech_client::AudioFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where each chunk's audio goes for one run.
#[derive(Debug, Clone)]
pub struct OutputPlan {
    output: PathBuf,
    format: AudioFormat,
    chunk_count: usize,
    combine: bool,
}

impl OutputPlan {
    pub fn new(output: &Path, format: AudioFormat, chunk_count: usize, combine: bool) -> Self {
        Self {
            output: output.to_path_buf(),
            format,
            chunk_count,
            combine,
        }
    }

    /// More than one artifact will be written.
    pub fn is_multi_file(&self) -> bool {
        self.chunk_count > 1
    }

    /// A concat manifest is written and the artifacts combined afterwards.
    pub fn writes_manifest(&self) -> bool {
        self.combine && self.is_multi_file()
    }

    /// Destination for the chunk at `chunk_id` (0-based).
    ///
    /// A single chunk goes straight to the output path; otherwise
    /// `<base>_<n>.<ext>` with a 1-based `n`.
    pub fn destination(&self, chunk_id: usize) -> PathBuf {
        if !self.is_multi_file() {
            return self.output.clone();
        }
        self.sibling(&format!("_{}.{}", chunk_id + 1, self.format.extension()))
    }

    /// Path of the concat manifest, `<base>.txt`.
    pub fn manifest_path(&self) -> PathBuf {
        self.sibling(".txt")
    }

    /// Output path with its extension replaced by `suffix`.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.output.with_extension("").into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}
