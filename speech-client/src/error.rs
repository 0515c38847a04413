use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("API key not found. Set {env_var} environment variable or run 'tts --configure'.")]
    MissingApiKey { env_var: String },

    #[error("OpenAI API request failed with status code: {status}, response body: {body}")]
    Api { status: u16, body: String },

    #[error("unable to send request to OpenAI API: {0}")]
    Transport(String),

    #[error("request to OpenAI API timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SpeechError>;
