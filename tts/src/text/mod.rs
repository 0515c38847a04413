//! Text processing for TTS: splitting input into request-sized chunks.

pub mod chunker;

pub use chunker::chunk_text;

use std::borrow::Cow;

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the input, starting at 0
    pub chunk_id: usize,
    /// The text content, without framing
    pub text: String,
    /// Whether the payload is wrapped in framing text
    pub framed: bool,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(chunk_id: usize, text: String, framed: bool) -> Self {
        Self {
            chunk_id,
            text,
            framed,
        }
    }

    /// The text sent to the endpoint, framed if requested.
    pub fn payload(&self) -> Cow<'_, str> {
        if self.framed {
            Cow::Owned(chunker::add_framing(&self.text))
        } else {
            Cow::Borrowed(&self.text)
        }
    }

    /// Length of the payload in characters.
    pub fn payload_len(&self) -> usize {
        self.payload().chars().count()
    }
}
