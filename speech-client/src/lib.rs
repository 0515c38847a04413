//! Shared text-to-speech client library for the tts workspace
//!
//! Provides the pieces needed to talk to the speech endpoint:
//! - A replaceable `Transport` (reqwest for real use, a scripted mock for tests)
//! - Typed request selectors (voice, model, format, speed)
//! - Persisted configuration and API key resolution

pub mod config;
pub mod error;
pub mod speech;
pub mod transport;
pub mod transports;

pub use config::{API_KEY_ENV_VAR, ApiKey, Config, Defaults};
pub use error::{Result, SpeechError};
pub use speech::{
    API_MAX_CHARACTERS, AudioFormat, Model, SPEECH_ENDPOINT, Speed, SpeechClient, SpeechRequest,
    SpeechSettings, Voice,
};
pub use transport::{ByteStream, HttpRequest, HttpResponse, Transport};
pub use transports::{MockTransport, ReqwestTransport};
