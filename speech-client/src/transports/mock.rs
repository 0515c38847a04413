//! Mock transport for testing
//!
//! Replays a script of responses in order without touching the network and
//! records every request it receives.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Result, SpeechError};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond with a status and body
    Respond { status: u16, body: Vec<u8> },
    /// Fail at the transport level
    Fail(String),
}

/// A transport that answers from a script
pub struct MockTransport {
    /// Outcomes consumed one per call
    script: Mutex<VecDeque<Scripted>>,
    /// Outcome used once the script runs out
    fallback: Option<Scripted>,
    /// Every request received, in order
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport with an empty script and no fallback
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a transport that answers every call with 200 and `body`
    pub fn always_succeeds(body: &[u8]) -> Self {
        Self {
            fallback: Some(Scripted::Respond {
                status: 200,
                body: body.to_vec(),
            }),
            ..Self::new()
        }
    }

    /// Create a transport whose every call fails with `message`
    pub fn always_fails(message: &str) -> Self {
        Self {
            fallback: Some(Scripted::Fail(message.to_string())),
            ..Self::new()
        }
    }

    /// Queue a response
    pub fn then_respond(self, status: u16, body: &[u8]) -> Self {
        self.push(Scripted::Respond {
            status,
            body: body.to_vec(),
        })
    }

    /// Queue a transport failure
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Scripted::Fail(message.to_string()))
    }

    fn push(self, outcome: Scripted) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// Get the number of times send() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Get a copy of every request received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);

        let next = self.script.lock().unwrap().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(Scripted::Respond { status, body }) => Ok(HttpResponse {
                status,
                body: stream::iter(vec![Ok(body)]).boxed(),
            }),
            Some(Scripted::Fail(message)) => Err(SpeechError::Transport(message)),
            None => Err(SpeechError::Transport(
                "mock transport has no scripted response".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: "POST".to_string(),
            url: "http://localhost/speech".to_string(),
            headers: Vec::new(),
            body: b"{}".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let transport = MockTransport::always_succeeds(b"audio");

        for _ in 0..3 {
            let response = transport.send(request()).await.unwrap();
            assert_eq!(response.status, 200);
            assert_eq!(response.into_bytes().await.unwrap(), b"audio");
        }
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let transport = MockTransport::always_fails("network error");
        let err = transport.send(request()).await.unwrap_err();
        assert!(matches!(err, SpeechError::Transport(ref m) if m == "network error"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let transport = MockTransport::always_succeeds(b"ok")
            .then_respond(500, b"boom")
            .then_fail("reset");

        let first = transport.send(request()).await.unwrap();
        assert_eq!(first.status, 500);
        assert!(transport.send(request()).await.is_err());
        let third = transport.send(request()).await.unwrap();
        assert_eq!(third.status, 200);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_script_without_fallback() {
        let transport = MockTransport::new().then_respond(200, b"one");
        assert!(transport.send(request()).await.is_ok());
        assert!(transport.send(request()).await.is_err());
    }
}
