//! Combining chunk artifacts into a single audio file.

pub mod combiner;

pub use combiner::{CleanupReport, Combiner};
