//! Sequential per-chunk submission to the speech endpoint.

mod ledger;
mod manifest;
mod output;

pub use ledger::Ledger;
pub use output::OutputPlan;

use manifest::Manifest;

use crate::job::JobConfig;
use crate::limiter::RateLimiter;
use crate::text::TextChunk;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use speech_client::{ByteStream, SpeechClient, SpeechRequest};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Drives chunks through the speech client one at a time.
pub struct Dispatcher<'a> {
    client: &'a SpeechClient,
    job: &'a JobConfig,
    limiter: RateLimiter,
}

impl<'a> Dispatcher<'a> {
    pub fn new(client: &'a SpeechClient, job: &'a JobConfig) -> Self {
        let limiter = RateLimiter::new(job.rate_limit);
        if let Some(period) = limiter.period() {
            log::debug!("Rate limiting to one request every {:?}", period);
        }
        Self {
            client,
            job,
            limiter,
        }
    }

    /// Synthesize every chunk in order and write each to its destination.
    ///
    /// Every file created is recorded in `ledger`, including on failure.
    /// The first failing chunk aborts the run; earlier artifacts stay on disk.
    /// `on_saved` is called after each artifact is fully written.
    pub async fn process<F>(
        &mut self,
        chunks: &[TextChunk],
        ledger: &mut Ledger,
        mut on_saved: F,
    ) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&Path),
    {
        let plan = self.job.plan(chunks.len());
        let mut manifest = plan
            .writes_manifest()
            .then(|| Manifest::new(plan.manifest_path()));
        let mut produced = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let destination = plan.destination(chunk.chunk_id);

            if let Some(manifest) = manifest.as_mut() {
                let first_entry = !manifest.is_created();
                manifest.append(&destination).await.with_context(|| {
                    format!("Error writing to text file {}", manifest.path().display())
                })?;
                if first_entry {
                    ledger.record(manifest.path());
                }
            }

            self.limiter.acquire().await;

            log::debug!(
                "Sending chunk {}/{} ({} characters)",
                chunk.chunk_id + 1,
                chunks.len(),
                chunk.payload_len()
            );
            let request = SpeechRequest::new(chunk.payload(), &self.job.settings);
            let body = self.client.synthesize(&request).await.with_context(|| {
                format!(
                    "Chunk {}/{} failed for {}",
                    chunk.chunk_id + 1,
                    chunks.len(),
                    destination.display()
                )
            })?;

            let bytes = write_artifact(&destination, body, ledger).await?;
            log::info!(
                "Audio file saved successfully: {} ({})",
                destination.display(),
                format_bytes(bytes)
            );

            on_saved(&destination);
            produced.push(destination);
        }

        Ok(produced)
    }
}

/// Stream a response body into a freshly created file.
async fn write_artifact(destination: &Path, mut body: ByteStream, ledger: &mut Ledger) -> Result<u64> {
    let mut file = tokio::fs::File::create(destination)
        .await
        .with_context(|| format!("Unable to create output file {}", destination.display()))?;
    ledger.record(destination);

    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Error reading response")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Unable to write to output file {}", destination.display()))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .with_context(|| format!("Unable to write to output file {}", destination.display()))?;

    Ok(written)
}

/// Format bytes for human-readable display.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::chunk_text;
    use speech_client::{ApiKey, MockTransport, SpeechError};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn job_in(dir: &TempDir, combine: bool) -> JobConfig {
        let mut job = JobConfig::new(dir.path().join("input.md"), dir.path().join("book.mp3"));
        job.combine = combine;
        job.max_chunk_size = 10;
        job
    }

    fn client(transport: &Arc<MockTransport>) -> SpeechClient {
        SpeechClient::new(transport.clone(), ApiKey::new("test-api-key"))
    }

    fn sent_inputs(transport: &MockTransport) -> Vec<String> {
        transport
            .requests()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["input"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_single_chunk_writes_output_path() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, true);
        let transport = Arc::new(MockTransport::always_succeeds(b"Mock audio data"));
        let client = client(&transport);
        let chunks = chunk_text("Short", job.max_chunk_size, false).unwrap();

        let mut ledger = Ledger::new();
        let produced = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(produced, vec![job.output.clone()]);
        assert_eq!(std::fs::read(&job.output).unwrap(), b"Mock audio data");
        assert!(!job.plan(1).manifest_path().exists());
        assert_eq!(ledger.files(), &[job.output.clone()]);
    }

    #[tokio::test]
    async fn test_multi_chunk_manifest_in_order() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, true);
        let transport = Arc::new(MockTransport::always_succeeds(b"audio"));
        let client = client(&transport);
        let chunks = chunk_text("alpha beta gamma delta", job.max_chunk_size, false).unwrap();
        assert_eq!(chunks.len(), 3);

        let mut ledger = Ledger::new();
        let mut saved = Vec::new();
        let produced = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |p| saved.push(p.to_path_buf()))
            .await
            .unwrap();

        let manifest = std::fs::read_to_string(dir.path().join("book.txt")).unwrap();
        assert_eq!(
            manifest,
            "file 'book_1.mp3'\nfile 'book_2.mp3'\nfile 'book_3.mp3'\n"
        );
        assert_eq!(produced, saved);
        assert_eq!(produced[2], dir.path().join("book_3.mp3"));
        for path in &produced {
            assert_eq!(std::fs::read(path).unwrap(), b"audio");
        }

        // Manifest first, then artifacts in order
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.files()[0], dir.path().join("book.txt"));
        assert_eq!(&ledger.files()[1..], produced.as_slice());

        assert_eq!(
            sent_inputs(&transport),
            vec!["alpha beta", " gamma", " delta"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_multi_chunk_without_combine_has_no_manifest() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, false);
        let transport = Arc::new(MockTransport::always_succeeds(b"audio"));
        let client = client(&transport);
        let chunks = chunk_text("alpha beta gamma delta", job.max_chunk_size, false).unwrap();

        let mut ledger = Ledger::new();
        let produced = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(produced.len(), chunks.len());
        assert!(!dir.path().join("book.txt").exists());
        assert_eq!(ledger.files(), produced.as_slice());
    }

    #[tokio::test]
    async fn test_error_status_stops_dispatch() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, false);
        let transport = Arc::new(
            MockTransport::always_succeeds(b"audio")
                .then_respond(200, b"first")
                .then_respond(429, b"Rate limit reached"),
        );
        let client = client(&transport);
        let chunks = chunk_text("alpha beta gamma delta", job.max_chunk_size, false).unwrap();
        assert_eq!(chunks.len(), 3);

        let mut ledger = Ledger::new();
        let err = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap_err();

        // Chunk 3 was never sent
        assert_eq!(transport.call_count(), 2);

        let speech_err = err.downcast_ref::<SpeechError>().unwrap();
        assert!(matches!(
            speech_err,
            SpeechError::Api { status: 429, body } if body == "Rate limit reached"
        ));
        assert!(format!("{:#}", err).contains("Chunk 2/3"));

        // The first artifact is kept
        assert_eq!(std::fs::read(dir.path().join("book_1.mp3")).unwrap(), b"first");
        assert!(!dir.path().join("book_2.mp3").exists());
        assert_eq!(ledger.files(), &[dir.path().join("book_1.mp3")]);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, true);
        let transport = Arc::new(MockTransport::always_fails("network error"));
        let client = client(&transport);
        let chunks = chunk_text("one two three four", job.max_chunk_size, false).unwrap();

        let mut ledger = Ledger::new();
        let err = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap_err();

        assert_eq!(transport.call_count(), 1);
        assert!(format!("{:#}", err).contains("network error"));
        // Only the manifest was created before the failing call
        assert_eq!(ledger.files(), &[dir.path().join("book.txt")]);
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut job = job_in(&dir, false);
        job.output = dir.path().join("missing").join("book.mp3");
        let transport = Arc::new(MockTransport::always_succeeds(b"audio"));
        let client = client(&transport);
        let chunks = chunk_text("Short", job.max_chunk_size, false).unwrap();

        let mut ledger = Ledger::new();
        let err = Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unable to create output file"));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_existing_artifact_is_truncated() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir, false);
        std::fs::write(&job.output, b"a much longer stale payload").unwrap();
        let transport = Arc::new(MockTransport::always_succeeds(b"new"));
        let client = client(&transport);
        let chunks = chunk_text("Short", job.max_chunk_size, false).unwrap();

        let mut ledger = Ledger::new();
        Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(std::fs::read(&job.output).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_framed_payload_is_sent() {
        let dir = TempDir::new().unwrap();
        let mut job = job_in(&dir, false);
        job.buffer_text = true;
        job.max_chunk_size = 4096;
        let transport = Arc::new(MockTransport::always_succeeds(b"audio"));
        let client = client(&transport);
        let chunks = chunk_text("Hello", job.max_chunk_size, job.buffer_text).unwrap();

        let mut ledger = Ledger::new();
        Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap();

        assert_eq!(sent_inputs(&transport), vec!["Begin Text\nHello\nEnd Text".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_paces_requests() {
        let dir = TempDir::new().unwrap();
        let mut job = job_in(&dir, false);
        job.rate_limit = 60;
        let transport = Arc::new(MockTransport::always_succeeds(b"audio"));
        let client = client(&transport);
        let chunks = chunk_text("alpha beta gamma delta", job.max_chunk_size, false).unwrap();

        let start = tokio::time::Instant::now();
        let mut ledger = Ledger::new();
        Dispatcher::new(&client, &job)
            .process(&chunks, &mut ledger, |_| {})
            .await
            .unwrap();

        // Three permits: immediate, +1s, +2s
        assert!(start.elapsed() >= std::time::Duration::from_secs(2));
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
    }
}
