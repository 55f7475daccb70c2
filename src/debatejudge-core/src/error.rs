//! Error types for the debate system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("Transcript store error: {0}")]
    StoreError(String),

    #[error("TTS error: {0}")]
    TtsError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
