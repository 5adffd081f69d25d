//! Intent matching
//!
//! Maps one recognized utterance to exactly one action. Rules are a fixed,
//! ordered list of trigger substrings; the first rule with any trigger
//! occurring anywhere in the utterance wins. Trigger phrases overlap (e.g.
//! "hello rose" also contains "hello"), so declaration order is a contract:
//! ties are broken by position in the table, never by specificity.

/// Action selected for an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Wake phrase acknowledgment ("hey rose")
    Attention,
    /// Plain greeting
    Greeting,
    /// Speak the current time
    TimeOfDay,
    /// Speak the current date
    DateToday,
    /// Status report
    Status,
    /// Acknowledge thanks
    Thanks,
    /// Reset the agent's conversation history
    ClearHistory,
    /// Farewell and shut down
    Exit,
    /// No trigger matched: hand the utterance to the AI backend
    Delegate,
}

/// One intent rule: any trigger substring selects the action
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Trigger substrings, matched anywhere in the utterance
    pub triggers: &'static [&'static str],
    /// Action fired when a trigger matches
    pub action: Action,
}

/// Built-in intent table. Order is significant: `Attention` must precede
/// `Greeting` because "hello rose" contains "hello".
pub const RULES: &[Rule] = &[
    Rule { triggers: &["hey rose", "hello rose"], action: Action::Attention },
    // A bare "hi" trigger would shadow any utterance containing the
    // substring ("clear history", "phishing"), so greeting is "hello" only
    Rule { triggers: &["hello"], action: Action::Greeting },
    Rule { triggers: &["what time", "tell me the time"], action: Action::TimeOfDay },
    Rule { triggers: &["what day", "what's the date"], action: Action::DateToday },
    Rule { triggers: &["how are you"], action: Action::Status },
    Rule { triggers: &["thank you", "thanks"], action: Action::Thanks },
    Rule { triggers: &["clear history", "reset conversation"], action: Action::ClearHistory },
    Rule { triggers: &["exit", "goodbye", "shut down"], action: Action::Exit },
];

/// Resolves utterances against an ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct IntentMatcher {
    rules: &'static [Rule],
}

impl IntentMatcher {
    /// Create a matcher over the built-in rule table
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: RULES }
    }

    /// Create a matcher over a custom rule table (order preserved)
    #[must_use]
    pub const fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Map an utterance to an action
    ///
    /// Scans rules in declaration order and returns the first whose trigger
    /// occurs as a substring. Absence of a match is not an error: the caller
    /// gets `Action::Delegate`.
    #[must_use]
    pub fn resolve(&self, utterance: &str) -> Action {
        for rule in self.rules {
            if rule.triggers.iter().any(|t| utterance.contains(t)) {
                return rule.action;
            }
        }
        Action::Delegate
    }
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_wake_phrase() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.resolve("hey rose"), Action::Attention);
        assert_eq!(matcher.resolve("okay hello rose are you there"), Action::Attention);
    }

    #[test]
    fn wake_phrase_wins_over_greeting() {
        // "hello rose" contains "hello"; declaration order must decide
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.resolve("hello rose"), Action::Attention);
        assert_eq!(matcher.resolve("hello there"), Action::Greeting);
    }

    #[test]
    fn resolves_time_and_date() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.resolve("what time is it"), Action::TimeOfDay);
        assert_eq!(matcher.resolve("tell me the time please"), Action::TimeOfDay);
        assert_eq!(matcher.resolve("what day is it"), Action::DateToday);
        assert_eq!(matcher.resolve("what's the date"), Action::DateToday);
    }

    #[test]
    fn unmatched_falls_through_to_delegate() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.resolve("explain sql injection"), Action::Delegate);
    }

    #[test]
    fn exit_triggers() {
        let matcher = IntentMatcher::new();
        assert_eq!(matcher.resolve("exit"), Action::Exit);
        assert_eq!(matcher.resolve("goodbye"), Action::Exit);
        assert_eq!(matcher.resolve("please shut down"), Action::Exit);
    }

    #[test]
    fn first_matching_rule_wins_in_custom_table() {
        const AMBIGUOUS: &[Rule] = &[
            Rule { triggers: &["what"], action: Action::Status },
            Rule { triggers: &["what time"], action: Action::TimeOfDay },
        ];
        let matcher = IntentMatcher::with_rules(AMBIGUOUS);
        // Both rules match; the lower-index rule must win
        assert_eq!(matcher.resolve("what time is it"), Action::Status);
    }
}
