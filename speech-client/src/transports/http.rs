//! HTTP transport backed by reqwest

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method};
use std::time::Duration;

use crate::error::{Result, SpeechError};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Upper bound on a single call, including reading the body
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Transport that talks to the network
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the default 90 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom per-call timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> SpeechError {
    if err.is_timeout() {
        SpeechError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        SpeechError::Transport(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_| SpeechError::InvalidValue {
                field: "method",
                value: request.method.clone(),
            })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let timeout = self.timeout;
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| map_reqwest_error(e, timeout))
            })
            .boxed();

        Ok(HttpResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
