//! Local model runner backed by the `ollama` CLI
//!
//! The model runs as a subprocess per question: the conversation window is
//! flattened into one text prompt, handed to `ollama run`, and the trimmed
//! stdout is the reply. Every failure mode maps to apologetic spoken text;
//! nothing here propagates an error to the loop.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::{Agent, ConversationHistory, Role};
use crate::Result;

/// Timeout for the availability probe (`ollama list`)
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Reply when the backend was never available
const UNAVAILABLE_REPLY: &str =
    "AI is not available. Please install Ollama and download a model.";

/// Reply when the runner exits nonzero
const RUNNER_ERROR_REPLY: &str = "I'm having trouble thinking right now. Please try again.";

/// Reply when the runner exceeds the ask timeout
const TIMEOUT_REPLY: &str = "Sorry, I'm thinking too slowly. Try asking something simpler.";

/// Reply when the runner cannot be spawned or its output is unreadable
const INTERNAL_ERROR_REPLY: &str = "Something went wrong with my AI processing.";

/// Reminder appended to the current question in the composed prompt only
const BRIEF_SUFFIX: &str = "(Keep response brief - 2-3 sentences for voice output)";

/// System prompt framing every conversation
const SYSTEM_PROMPT: &str = "\
You are ROSE (Raspberry Operated Speech Engine), a voice-activated cybersecurity assistant.

Keep responses BRIEF (2-3 sentences) since they'll be spoken aloud. Only expand if asked.

You help with:
- Security concepts and vulnerabilities
- Network security and penetration testing
- Linux security and hardening
- Security tools (nmap, wireshark, metasploit)
- Code security review
- CVE explanations
";

/// Conversational agent backed by a local ollama model
pub struct OllamaAgent {
    model: String,
    history: ConversationHistory,
    ask_timeout: Duration,
    available: bool,
}

impl OllamaAgent {
    /// Probe the local ollama install and construct the agent
    ///
    /// Unavailability (binary missing, model not pulled, probe failure) is a
    /// valid degraded state, not an error: the loop runs in basic mode.
    pub async fn connect(model: &str, max_history: usize, ask_timeout: Duration) -> Self {
        let available = probe(model).await;
        if available {
            tracing::info!(model, "ollama ready");
        }
        Self::with_availability(model, max_history, ask_timeout, available)
    }

    fn with_availability(
        model: &str,
        max_history: usize,
        ask_timeout: Duration,
        available: bool,
    ) -> Self {
        Self {
            model: model.to_string(),
            history: ConversationHistory::new(max_history),
            ask_timeout,
            available,
        }
    }

    /// The configured model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Flatten system prompt, history, and the current question into the
    /// literal text prompt handed to the model runner
    fn compose_prompt(&self, user_message: &str) -> String {
        let mut parts = vec![format!("System: {SYSTEM_PROMPT}\n")];

        for msg in &self.history {
            let label = match msg.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            parts.push(format!("{label}: {}\n", msg.content));
        }

        parts.push(format!("User: {user_message}\n\n{BRIEF_SUFFIX}\n"));
        parts.push("Assistant:".to_string());
        parts.join("\n")
    }
}

#[async_trait]
impl Agent for OllamaAgent {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn ask(&mut self, text: &str) -> Result<String> {
        if !self.available {
            return Ok(UNAVAILABLE_REPLY.to_string());
        }

        let prompt = self.compose_prompt(text);
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "asking model");

        let run = Command::new("ollama")
            .arg("run")
            .arg(&self.model)
            .arg(&prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.ask_timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to run ollama");
                return Ok(INTERNAL_ERROR_REPLY.to_string());
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.ask_timeout, "model runner timed out");
                return Ok(TIMEOUT_REPLY.to_string());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(code = ?output.status.code(), %stderr, "ollama run failed");
            return Ok(RUNNER_ERROR_REPLY.to_string());
        }

        let reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
        self.history.push_exchange(text, &reply);
        Ok(reply)
    }

    fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("conversation history cleared");
    }

    fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

/// Check that the ollama binary exists and the model has been pulled
async fn probe(model: &str) -> bool {
    if which::which("ollama").is_err() {
        tracing::warn!("ollama not found on PATH; AI features disabled");
        return false;
    }

    let list = Command::new("ollama")
        .arg("list")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match timeout(PROBE_TIMEOUT, list).await {
        Ok(Ok(output)) if output.status.success() => {
            let listed = String::from_utf8_lossy(&output.stdout);
            if listed.contains(model) {
                true
            } else {
                tracing::warn!(model, "model not pulled; run `ollama pull {model}`");
                false
            }
        }
        Ok(Ok(output)) => {
            tracing::warn!(code = ?output.status.code(), "ollama list failed");
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not query ollama");
            false
        }
        Err(_) => {
            tracing::warn!("ollama list timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_agent() -> OllamaAgent {
        OllamaAgent::with_availability("qwen2.5:0.5b", 2, Duration::from_secs(60), false)
    }

    #[tokio::test]
    async fn unavailable_agent_apologizes_without_touching_history() {
        let mut agent = offline_agent();
        let reply = agent.ask("explain xss").await.unwrap();
        assert_eq!(reply, UNAVAILABLE_REPLY);
        assert!(agent.history().is_empty());
    }

    #[test]
    fn prompt_carries_system_header_and_trailing_cue() {
        let agent = offline_agent();
        let prompt = agent.compose_prompt("what is nmap");
        assert!(prompt.starts_with("System: You are ROSE"));
        assert!(prompt.contains("User: what is nmap"));
        assert!(prompt.contains(BRIEF_SUFFIX));
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn prompt_interleaves_history_in_order() {
        let mut agent = offline_agent();
        agent.history.push_exchange("first question", "first answer");
        agent.history.push_exchange("second question", "second answer");

        let prompt = agent.compose_prompt("third question");
        let first = prompt.find("first question").unwrap();
        let second = prompt.find("second question").unwrap();
        let third = prompt.find("third question").unwrap();
        assert!(first < second && second < third);
        assert!(prompt.contains("Assistant: first answer"));
    }
}
