//! Configuration management
//!
//! Load order: built-in defaults, then the optional TOML file at
//! `~/.config/rose/config.toml`, then CLI/env overrides applied by the
//! binary.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;

use crate::Result;
use self::file::RoseConfigFile;

/// Default ollama model: small enough to run on a Raspberry Pi 5
pub const DEFAULT_MODEL: &str = "qwen2.5:0.5b";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ollama model identifier
    pub model: String,

    /// Exchanges retained in the conversation window
    pub max_history: usize,

    /// Bound on one model query
    pub ask_timeout: Duration,

    /// Bound on waiting for speech to start
    pub listen_timeout: Duration,

    /// Bound on one phrase
    pub phrase_time_limit: Duration,

    /// Voice I/O configuration
    pub speech: SpeechConfig,
}

/// Voice I/O configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// TTS engine command
    pub tts_command: String,

    /// Speech rate in words per minute
    pub rate: u32,

    /// Volume, 0.0 to 1.0
    pub volume: f64,

    /// External recognizer command; `None` means console input
    pub listen_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_history: 2,
            ask_timeout: Duration::from_secs(60),
            listen_timeout: Duration::from_secs(10),
            phrase_time_limit: Duration::from_secs(10),
            speech: SpeechConfig::default(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tts_command: "espeak-ng".to_string(),
            rate: 150,
            volume: 0.9,
            listen_command: None,
        }
    }
}

impl Config {
    /// Load configuration: defaults overlaid with the user config file,
    /// when one exists
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let overlay: RoseConfigFile = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config file");

        let mut config = Self::default();
        config.apply(overlay);
        Ok(config)
    }

    /// Default config file location (`~/.config/rose/config.toml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rose").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn apply(&mut self, overlay: RoseConfigFile) {
        if let Some(model) = overlay.ai.model {
            self.model = model;
        }
        if let Some(max_history) = overlay.ai.max_history {
            self.max_history = max_history;
        }
        if let Some(secs) = overlay.ai.ask_timeout_secs {
            self.ask_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = overlay.speech.listen_timeout_secs {
            self.listen_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = overlay.speech.phrase_time_limit_secs {
            self.phrase_time_limit = Duration::from_secs(secs);
        }
        if let Some(tts) = overlay.speech.tts_command {
            self.speech.tts_command = tts;
        }
        if let Some(rate) = overlay.speech.rate {
            self.speech.rate = rate;
        }
        if let Some(volume) = overlay.speech.volume {
            self.speech.volume = volume;
        }
        if overlay.speech.listen_command.is_some() {
            self.speech.listen_command = overlay.speech.listen_command;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_history, 2);
        assert_eq!(config.ask_timeout, Duration::from_secs(60));
        assert_eq!(config.listen_timeout, Duration::from_secs(10));
        assert_eq!(config.speech.tts_command, "espeak-ng");
        assert!(config.speech.listen_command.is_none());
    }

    #[test]
    fn file_overlays_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[ai]\nmodel = \"llama3.2:3b\"\nmax_history = 4\n\n[speech]\nrate = 120\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.model, "llama3.2:3b");
        assert_eq!(config.max_history, 4);
        assert_eq!(config.speech.rate, 120);
        // Untouched fields keep their defaults
        assert_eq!(config.ask_timeout, Duration::from_secs(60));
        assert!((config.speech.volume - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[ai\nmodel = ").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }
}
