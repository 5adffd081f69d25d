//! Voice I/O
//!
//! [`Speech`] is the narrow contract the loop depends on: speak text aloud,
//! listen for one utterance. [`VoiceHandler`] is the real implementation:
//! synthesis via a local TTS engine subprocess (espeak-ng by default) and
//! recognition via either a configured recognizer command or a console
//! fallback for machines without audio hardware.
//!
//! Per the listen contract, timeout, unintelligible input, and recognizer
//! failure all fold into an empty string. The caller never distinguishes
//! them; diagnostics go to the log. Console EOF is the one exception:
//! stdin will never produce input again, so it surfaces as
//! [`Error::InputClosed`] and ends the session.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Speech I/O contract
#[async_trait]
pub trait Speech {
    /// Speak text aloud (and echo it to the operator console)
    ///
    /// # Errors
    ///
    /// Real backends log synthesis failures and return `Ok`; test doubles
    /// may return errors to exercise the loop's recovery path.
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Listen for one utterance
    ///
    /// Returns lowercase recognized text, or an empty string on timeout,
    /// unintelligible input, or recognizer failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] when the input source is permanently
    /// closed (console EOF); recoverable failures fold into the empty
    /// string instead. Test doubles may return other errors.
    async fn listen(&mut self, wait: Duration, phrase_limit: Duration) -> Result<String>;
}

/// How utterances are recognized
enum Recognizer {
    /// Read a line from stdin (no audio hardware required)
    Console(Lines<BufReader<Stdin>>),
    /// Spawn an external recognizer command; one line of stdout is the text
    Command { program: String, args: Vec<String> },
}

/// Speech I/O backed by local subprocesses
pub struct VoiceHandler {
    tts_program: String,
    tts_available: bool,
    rate: u32,
    amplitude: u32,
    recognizer: Recognizer,
}

impl VoiceHandler {
    /// Construct the handler from speech configuration
    ///
    /// A missing TTS engine degrades to console-only output with a warning;
    /// it is not an initialization failure.
    ///
    /// # Errors
    ///
    /// Returns error if the configured recognizer command is blank.
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let tts_available = which::which(&config.tts_command).is_ok();
        if !tts_available {
            tracing::warn!(
                engine = %config.tts_command,
                "TTS engine not found; replies will be console-only"
            );
        }

        let recognizer = match &config.listen_command {
            Some(command) => {
                let (program, args) = split_command(command)?;
                tracing::debug!(%program, "using external recognizer");
                Recognizer::Command { program, args }
            }
            None => Recognizer::Console(BufReader::new(tokio::io::stdin()).lines()),
        };

        Ok(Self {
            tts_program: config.tts_command.clone(),
            tts_available,
            rate: config.rate,
            amplitude: volume_to_amplitude(config.volume),
            recognizer,
        })
    }

    /// Run the TTS engine and wait for playback to finish
    async fn synthesize(&self, text: &str) -> Result<()> {
        let status = Command::new(&self.tts_program)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude.to_string())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;

        if !status.success() {
            return Err(Error::Tts(format!(
                "{} exited with {status}",
                self.tts_program
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Speech for VoiceHandler {
    async fn speak(&mut self, text: &str) -> Result<()> {
        println!("ROSE: {text}");

        if self.tts_available {
            // Synthesis failure is logged, not propagated: the console echo
            // above already delivered the reply.
            if let Err(e) = self.synthesize(text).await {
                tracing::warn!(error = %e, "TTS failed");
            }
        }
        Ok(())
    }

    async fn listen(&mut self, wait: Duration, phrase_limit: Duration) -> Result<String> {
        let text = match &mut self.recognizer {
            Recognizer::Console(lines) => {
                tracing::debug!("listening on console");
                match timeout(wait + phrase_limit, lines.next_line()).await {
                    Ok(Ok(Some(line))) => line,
                    Ok(Ok(None)) => {
                        // EOF is permanent; an empty utterance would make
                        // the loop re-listen in a hot spin
                        tracing::info!("stdin closed, ending session");
                        return Err(Error::InputClosed);
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "console read failed");
                        String::new()
                    }
                    Err(_) => {
                        tracing::debug!("timeout - no input");
                        String::new()
                    }
                }
            }
            Recognizer::Command { program, args } => {
                tracing::debug!(%program, "listening via recognizer command");
                let run = Command::new(&*program)
                    .args(&*args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .output();

                match timeout(wait + phrase_limit, run).await {
                    Ok(Ok(output)) if output.status.success() => {
                        String::from_utf8_lossy(&output.stdout).into_owned()
                    }
                    Ok(Ok(output)) => {
                        tracing::warn!(code = ?output.status.code(), "recognizer failed");
                        String::new()
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "could not spawn recognizer");
                        String::new()
                    }
                    Err(_) => {
                        tracing::debug!("timeout - no speech detected");
                        String::new()
                    }
                }
            }
        };

        let utterance = normalize(&text);
        if !utterance.is_empty() {
            println!("You: {utterance}");
        }
        Ok(utterance)
    }
}

/// Normalize recognized text: trim and lowercase
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Map a 0.0..=1.0 volume to the espeak amplitude scale (0..=200)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn volume_to_amplitude(volume: f64) -> u32 {
    (volume.clamp(0.0, 1.0) * 200.0).round() as u32
}

/// Split a recognizer command line into program and arguments
fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(ToString::to_string);
    let program = parts
        .next()
        .ok_or_else(|| Error::Config("listen_command is empty".to_string()))?;
    Ok((program, parts.collect()))
}
