//! Main control loop
//!
//! One logical task drives everything: listen for an utterance, resolve it
//! to an action, execute, repeat. Empty utterances re-enter listening. The
//! loop terminates only on the exit intent or a caught interrupt; every
//! per-turn failure is absorbed, logged, and answered with a spoken apology.

use chrono::Local;

use crate::agent::Agent;
use crate::config::Config;
use crate::intent::{Action, IntentMatcher};
use crate::voice::Speech;
use crate::{Error, Result};

/// Spoken when a per-turn error is caught
const APOLOGY_REPLY: &str = "An error occurred. Please check the console.";

/// Outcome of one dispatched turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Return to listening
    Continue,
    /// Clean shutdown requested
    Exit,
}

/// The assistant's read-process-respond loop
///
/// Owns the speech and agent collaborators for the process lifetime. Both
/// are trait parameters so the loop can run against scripted doubles.
pub struct Daemon<S: Speech, A: Agent> {
    speech: S,
    agent: A,
    matcher: IntentMatcher,
    config: Config,
}

impl<S: Speech, A: Agent> Daemon<S, A> {
    /// Create the daemon from its collaborators
    #[must_use]
    pub const fn new(config: Config, speech: S, agent: A) -> Self {
        Self {
            speech,
            agent,
            matcher: IntentMatcher::new(),
            config,
        }
    }

    /// Run until the exit intent or an interrupt
    ///
    /// # Errors
    ///
    /// Per-turn failures never surface here; the only error paths are the
    /// startup greeting (if the speech backend fails before the loop has a
    /// recovery context).
    pub async fn run(&mut self) -> Result<()> {
        self.greet().await?;

        loop {
            let turn = tokio::select! {
                turn = self.next_turn() => turn,
                _ = tokio::signal::ctrl_c() => {
                    self.acknowledge_interrupt().await;
                    break;
                }
            };

            match turn {
                Ok(Turn::Continue) => {}
                Ok(Turn::Exit) => break,
                Err(Error::InputClosed) => {
                    // Input source is gone for good; spinning on re-listen
                    // would never make progress
                    tracing::info!("speech input closed, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error in main loop");
                    if let Err(e) = self.speech.speak(APOLOGY_REPLY).await {
                        tracing::error!(error = %e, "could not speak error reply");
                    }
                }
            }
        }

        Ok(())
    }

    /// Listen once and dispatch the utterance, if any
    async fn next_turn(&mut self) -> Result<Turn> {
        let utterance = self
            .speech
            .listen(self.config.listen_timeout, self.config.phrase_time_limit)
            .await?;

        if utterance.is_empty() {
            return Ok(Turn::Continue);
        }
        self.dispatch(&utterance).await
    }

    /// Resolve an utterance to an action and execute it
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors for the loop to absorb.
    pub async fn dispatch(&mut self, utterance: &str) -> Result<Turn> {
        let action = self.matcher.resolve(utterance);
        tracing::debug!(%utterance, ?action, "dispatching");

        match action {
            Action::Attention => {
                self.speech.speak("Yes? How can I help you?").await?;
            }
            Action::Greeting => {
                self.speech.speak("Hello! I'm here and listening.").await?;
            }
            Action::TimeOfDay => {
                let time = Local::now().format("%I:%M %p");
                self.speech.speak(&format!("The time is {time}.")).await?;
            }
            Action::DateToday => {
                let date = Local::now().format("%A, %B %d, %Y");
                self.speech.speak(&format!("Today is {date}.")).await?;
            }
            Action::Status => {
                self.speech
                    .speak("I'm functioning optimally. All systems nominal.")
                    .await?;
            }
            Action::Thanks => {
                self.speech.speak("You're welcome!").await?;
            }
            Action::ClearHistory => {
                if self.agent.is_available() {
                    self.agent.clear_history();
                    self.speech.speak("Conversation history cleared.").await?;
                } else {
                    self.speech.speak("AI is not available.").await?;
                }
            }
            Action::Exit => {
                self.speech
                    .speak("Understood. Rose shutting down. Goodbye.")
                    .await?;
                return Ok(Turn::Exit);
            }
            Action::Delegate => {
                if self.agent.is_available() {
                    self.speech.speak("Thinking...").await?;
                    let reply = self.agent.ask(utterance).await?;
                    self.speech.speak(&reply).await?;
                } else {
                    self.speech
                        .speak(&format!(
                            "I heard: {utterance}. I'm still learning new commands."
                        ))
                        .await?;
                }
            }
        }

        Ok(Turn::Continue)
    }

    /// Speak the interrupt acknowledgment before shutting down
    ///
    /// A failed acknowledgment is logged, never propagated: the interrupt
    /// is already committed to a clean exit.
    pub async fn acknowledge_interrupt(&mut self) {
        tracing::info!("interrupt received, shutting down");
        if let Err(e) = self
            .speech
            .speak("Manual interrupt received. Going offline.")
            .await
        {
            tracing::warn!(error = %e, "could not speak interrupt acknowledgment");
        }
    }

    /// Startup greeting sequence
    async fn greet(&mut self) -> Result<()> {
        self.speech
            .speak("System online. Rose activated and ready.")
            .await?;

        if self.agent.is_available() {
            self.speech
                .speak("Artificial intelligence module loaded. I can help with cybersecurity questions.")
                .await?;
        } else {
            self.speech
                .speak("Running in basic mode. AI features unavailable.")
                .await?;
        }

        self.speech
            .speak("Say hey rose to get my attention, or say exit to shut down.")
            .await?;
        Ok(())
    }

    /// The agent, for inspection in tests
    #[must_use]
    pub const fn agent(&self) -> &A {
        &self.agent
    }

    /// The speech backend, for inspection in tests
    #[must_use]
    pub const fn speech(&self) -> &S {
        &self.speech
    }
}
