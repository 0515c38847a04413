use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::error::Result;

/// Response body delivered incrementally as it arrives
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// An outbound HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status line and body stream returned by a transport
pub struct HttpResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl HttpResponse {
    /// Only `200 OK` carries audio; any other status is a failure
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Drain the body stream into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        let mut stream = self.body;
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk?);
        }
        Ok(collected)
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Trait for anything that can carry a request to the speech endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the status and body stream
    ///
    /// Network failures and timeouts are errors; non-success statuses are not.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Get the transport name for display
    fn name(&self) -> &'static str;
}
