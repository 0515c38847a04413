//! Splitting input text into chunks the speech endpoint will accept.

use super::TextChunk;
use thiserror::Error;

/// Prepended to each chunk when framing is enabled.
pub const PROLOGUE: &str = "Begin Text\n";

/// Appended to each chunk when framing is enabled.
pub const EPILOGUE: &str = "\nEnd Text";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Chunk size {max_size} leaves no room for text once framing is added")]
    BudgetTooSmall { max_size: usize },
}

/// Number of characters of source text that fit in one chunk.
pub fn chunk_budget(max_size: usize, framed: bool) -> Result<usize, ChunkError> {
    let framing = if framed {
        PROLOGUE.chars().count() + EPILOGUE.chars().count()
    } else {
        0
    };

    match max_size.checked_sub(framing) {
        Some(budget) if budget > 0 => Ok(budget),
        _ => Err(ChunkError::BudgetTooSmall { max_size }),
    }
}

/// Split text into chunks whose payload never exceeds `max_size` characters.
///
/// # Arguments
/// * `text` - The text to chunk
/// * `max_size` - Maximum payload size in characters, framing included
/// * `framed` - Wrap each chunk in `PROLOGUE`/`EPILOGUE`
///
/// # Returns
/// Chunks in source order. Concatenating their `text` reproduces the input.
pub fn chunk_text(text: &str, max_size: usize, framed: bool) -> Result<Vec<TextChunk>, ChunkError> {
    let budget = chunk_budget(max_size, framed)?;

    Ok(split_into_chunks(text, budget)
        .into_iter()
        .enumerate()
        .map(|(chunk_id, text)| TextChunk::new(chunk_id, text, framed))
        .collect())
}

/// Greedy split that prefers to break just before whitespace.
///
/// `budget` must be non-zero.
fn split_into_chunks(text: &str, budget: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut remaining: &[char] = &chars;
    let mut chunks = Vec::new();

    while !remaining.is_empty() {
        if remaining.len() <= budget {
            chunks.push(remaining.iter().collect());
            break;
        }

        let (head, tail) = remaining.split_at(find_split_point(remaining, budget));
        chunks.push(head.iter().collect());
        remaining = tail;
    }

    chunks
}

/// Scan backward from `budget` for whitespace; hard split at `budget` if none.
///
/// Index 0 is never chosen, so every chunk makes progress.
fn find_split_point(chars: &[char], budget: usize) -> usize {
    (1..=budget)
        .rev()
        .find(|&i| chars[i].is_whitespace())
        .unwrap_or(budget)
}

/// Wrap text in the framing prologue and epilogue.
pub fn add_framing(text: &str) -> String {
    format!("{}{}{}", PROLOGUE, text, EPILOGUE)
}

/// Recover the original text from a framed payload.
#[cfg(test)]
fn strip_framing(payload: &str) -> Option<&str> {
    payload.strip_prefix(PROLOGUE)?.strip_suffix(EPILOGUE)
}
