//! Settings for one synthesis run, passed explicitly to each stage.

use crate::dispatch::OutputPlan;
use speech_client::{API_MAX_CHARACTERS, SpeechSettings};
use std::path::PathBuf;

/// Everything a run needs except the credential.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Source text or Markdown file
    pub input: PathBuf,
    /// Requested audio output path
    pub output: PathBuf,
    /// Voice, model, format and speed for every request
    pub settings: SpeechSettings,
    /// Wrap each chunk in framing text
    pub buffer_text: bool,
    /// Calls per minute, 0 for unlimited
    pub rate_limit: u32,
    /// Combine chunk files into the output with ffmpeg
    pub combine: bool,
    /// Largest payload sent in one request, in characters
    pub max_chunk_size: usize,
}

impl JobConfig {
    pub fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            settings: SpeechSettings::default(),
            buffer_text: false,
            rate_limit: 0,
            combine: false,
            max_chunk_size: API_MAX_CHARACTERS,
        }
    }

    /// File layout for a run producing `chunk_count` chunks.
    pub fn plan(&self, chunk_count: usize) -> OutputPlan {
        OutputPlan::new(&self.output, self.settings.format, chunk_count, self.combine)
    }
}
