use std::path::PathBuf;

/// Ordered record of every file a run has created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    files: Vec<PathBuf>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
