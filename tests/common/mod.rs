//! Shared test doubles for the speech and agent contracts

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use rose_assistant::{Agent, ConversationHistory, Error, Result, Speech};

/// Speech double: feeds a scripted sequence of utterances, records replies
pub struct ScriptedSpeech {
    utterances: VecDeque<String>,
    close_after_script: bool,
    /// Everything the daemon spoke, in order
    pub spoken: Vec<String>,
}

impl ScriptedSpeech {
    /// Listen returns each scripted utterance in turn; once the script is
    /// exhausted it returns "exit" so `run` always terminates.
    #[must_use]
    pub fn hearing<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: utterances.into_iter().map(Into::into).collect(),
            close_after_script: false,
            spoken: Vec::new(),
        }
    }

    /// Like [`Self::hearing`], but the exhausted script reports a closed
    /// input source instead of "exit" (console EOF)
    #[must_use]
    pub fn hearing_then_closed<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            close_after_script: true,
            ..Self::hearing(utterances)
        }
    }

    /// Count how many times a reply was spoken
    #[must_use]
    pub fn count_spoken(&self, reply: &str) -> usize {
        self.spoken.iter().filter(|s| *s == reply).count()
    }
}

#[async_trait]
impl Speech for ScriptedSpeech {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken.push(text.to_string());
        Ok(())
    }

    async fn listen(&mut self, _wait: Duration, _phrase_limit: Duration) -> Result<String> {
        match self.utterances.pop_front() {
            Some(utterance) => Ok(utterance),
            None if self.close_after_script => Err(Error::InputClosed),
            None => Ok("exit".to_string()),
        }
    }
}

/// Agent double: canned replies, optional scripted failure, real history
pub struct ScriptedAgent {
    available: bool,
    failing: bool,
    replies: VecDeque<String>,
    history: ConversationHistory,
    /// Every question the daemon asked, in order
    pub asked: Vec<String>,
}

impl ScriptedAgent {
    #[must_use]
    pub fn available(max_history: usize) -> Self {
        Self {
            available: true,
            failing: false,
            replies: VecDeque::new(),
            history: ConversationHistory::new(max_history),
            asked: Vec::new(),
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            failing: false,
            replies: VecDeque::new(),
            history: ConversationHistory::new(2),
            asked: Vec::new(),
        }
    }

    /// Queue a reply for the next `ask`
    #[must_use]
    pub fn reply_with(mut self, reply: &str) -> Self {
        self.replies.push_back(reply.to_string());
        self
    }

    /// Make every `ask` fail
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Pre-populate the history with one exchange
    #[must_use]
    pub fn with_exchange(mut self, user: &str, assistant: &str) -> Self {
        self.history.push_exchange(user, assistant);
        self
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn ask(&mut self, text: &str) -> Result<String> {
        self.asked.push(text.to_string());
        if self.failing {
            return Err(Error::Agent("scripted failure".to_string()));
        }
        let reply = self
            .replies
            .pop_front()
            .unwrap_or_else(|| "scripted answer".to_string());
        self.history.push_exchange(text, &reply);
        Ok(reply)
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn history(&self) -> &ConversationHistory {
        &self.history
    }
}
