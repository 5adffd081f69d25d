//! Rose - voice-driven command dispatcher with a local AI fallback
//!
//! This library provides the core functionality for the `rose` binary:
//! - Intent matching (ordered trigger-phrase rules, first match wins)
//! - The main listen/dispatch/respond loop
//! - Voice I/O behind a narrow `Speech` contract
//! - A local model runner (ollama) behind the `Agent` contract, holding a
//!   bounded rolling conversation history
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Daemon                      │
//! │   listen → resolve intent → execute action   │
//! └─────────┬──────────────────────┬────────────┘
//!           │                      │
//! ┌─────────▼─────────┐  ┌─────────▼────────────┐
//! │   Speech (voice)   │  │   Agent (ollama)     │
//! │   speak / listen   │  │   ask / history      │
//! └───────────────────┘  └──────────────────────┘
//! ```
//!
//! Both collaborators are traits so the loop can be exercised end-to-end
//! in tests without audio hardware or a model runner.

pub mod agent;
pub mod config;
pub mod daemon;
pub mod error;
pub mod intent;
pub mod voice;

pub use agent::{Agent, ConversationHistory, Message, OllamaAgent, Role};
pub use config::Config;
pub use daemon::{Daemon, Turn};
pub use error::{Error, Result};
pub use intent::{Action, IntentMatcher, Rule};
pub use voice::{Speech, VoiceHandler};
