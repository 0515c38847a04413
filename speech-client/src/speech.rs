//! Speech endpoint request types and client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ApiKey;
use crate::error::{Result, SpeechError};
use crate::transport::{ByteStream, HttpRequest, Transport};

/// Fixed synthesis endpoint
pub const SPEECH_ENDPOINT: &str = "https://api.openai.com/v1/audio/speech";

/// Maximum input length the endpoint accepts, in characters
pub const API_MAX_CHARACTERS: usize = 4096;

/// Available voices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

impl FromStr for Voice {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.to_lowercase())
            .ok_or_else(|| SpeechError::InvalidValue {
                field: "voice",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesis models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "tts-1")]
    Tts1,
    #[default]
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tts1 => "tts-1",
            Self::Tts1Hd => "tts-1-hd",
        }
    }
}

impl FromStr for Model {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tts-1" => Ok(Self::Tts1),
            "tts-1-hd" => Ok(Self::Tts1Hd),
            _ => Err(SpeechError::InvalidValue {
                field: "model",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio container returned by the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Opus,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::Wav,
        AudioFormat::Pcm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// File extension for artifacts in this format
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for AudioFormat {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s.to_lowercase())
            .ok_or_else(|| SpeechError::InvalidValue {
                field: "format",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback speed, always within 0.25-4.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Speed(f32);

impl Speed {
    pub const MIN: f32 = 0.25;
    pub const MAX: f32 = 4.0;

    pub fn new(value: f32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SpeechError::InvalidValue {
                field: "speed",
                value: value.to_string(),
            })
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f32> for Speed {
    type Error = SpeechError;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Speed> for f32 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl FromStr for Speed {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f32 = s.trim().parse().map_err(|_| SpeechError::InvalidValue {
            field: "speed",
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Voice selection shared by every request in a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeechSettings {
    pub voice: Voice,
    pub model: Model,
    pub format: AudioFormat,
    pub speed: Speed,
}

/// JSON body for one synthesis call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub model: Model,
    pub input: String,
    pub voice: Voice,
    pub response_format: AudioFormat,
    pub speed: Speed,
}

impl SpeechRequest {
    /// Build the request for one piece of text
    pub fn new(input: impl Into<String>, settings: &SpeechSettings) -> Self {
        Self {
            model: settings.model,
            input: input.into(),
            voice: settings.voice,
            response_format: settings.format,
            speed: settings.speed,
        }
    }
}

/// Client for the speech endpoint over any transport
pub struct SpeechClient {
    transport: Arc<dyn Transport>,
    api_key: ApiKey,
    endpoint: String,
}

impl SpeechClient {
    /// Create a client against the default endpoint
    pub fn new(transport: Arc<dyn Transport>, api_key: ApiKey) -> Self {
        Self::with_endpoint(transport, api_key, SPEECH_ENDPOINT)
    }

    /// Create a client against a custom endpoint
    pub fn with_endpoint(transport: Arc<dyn Transport>, api_key: ApiKey, endpoint: &str) -> Self {
        Self {
            transport,
            api_key,
            endpoint: endpoint.to_string(),
        }
    }

    /// Encode a speech request as an authorized HTTP POST
    pub fn build_http_request(&self, request: &SpeechRequest) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: "POST".to_string(),
            url: self.endpoint.clone(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.api_key.expose()),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: serde_json::to_vec(request)?,
        })
    }

    /// Submit one request and return the audio body stream
    ///
    /// Any status other than 200 is returned as `SpeechError::Api` carrying the
    /// status code and response body verbatim.
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<ByteStream> {
        let http_request = self.build_http_request(request)?;

        log::debug!(
            "POST {} via {} ({} chars, voice={}, model={}, format={}, speed={})",
            self.endpoint,
            self.transport.name(),
            request.input.chars().count(),
            request.voice,
            request.model,
            request.response_format,
            request.speed
        );

        let response = self.transport.send(http_request).await?;

        if !response.is_success() {
            let status = response.status;
            let body = match response.into_bytes().await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("(unable to read response body: {})", e),
            };
            return Err(SpeechError::Api { status, body });
        }

        Ok(response.body)
    }
}
