//! TOML configuration file loading
//!
//! Supports `~/.config/rose/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of
//! defaults.

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RoseConfigFile {
    /// AI backend configuration
    #[serde(default)]
    pub ai: AiFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,
}

/// AI backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct AiFileConfig {
    /// Ollama model identifier (e.g. "qwen2.5:0.5b")
    pub model: Option<String>,

    /// Exchanges retained in the conversation window
    pub max_history: Option<usize>,

    /// Seconds to wait for a model reply
    pub ask_timeout_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// TTS engine command (e.g. "espeak-ng")
    pub tts_command: Option<String>,

    /// Speech rate in words per minute
    pub rate: Option<u32>,

    /// Volume, 0.0 to 1.0
    pub volume: Option<f64>,

    /// External recognizer command; omit for console input
    pub listen_command: Option<String>,

    /// Seconds to wait for speech to start
    pub listen_timeout_secs: Option<u64>,

    /// Maximum seconds for one phrase
    pub phrase_time_limit_secs: Option<u64>,
}
