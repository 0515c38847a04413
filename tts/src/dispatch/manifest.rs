//! FFmpeg concat demuxer manifest.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Format one `file '<name>'` line for an artifact.
///
/// Artifacts live beside the manifest and ffmpeg resolves entries relative to
/// the manifest, so only the file name is written.
pub fn manifest_line(artifact: &Path) -> String {
    let name = artifact
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| artifact.to_string_lossy());
    // Escape single quotes in path
    format!("file '{}'\n", name.replace('\'', "'\\''"))
}

/// Append-only manifest writer; the file is created fresh on first entry.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    file: Option<File>,
}

impl Manifest {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been created yet.
    pub fn is_created(&self) -> bool {
        self.file.is_some()
    }

    /// Append an entry for `artifact`, creating the manifest if needed.
    pub async fn append(&mut self, artifact: &Path) -> io::Result<()> {
        let file = match self.file.take() {
            Some(file) => file,
            None => File::create(&self.path).await?,
        };
        let file = self.file.insert(file);

        file.write_all(manifest_line(artifact).as_bytes()).await?;
        file.flush().await
    }
}
