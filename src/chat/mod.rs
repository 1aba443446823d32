//! Chat with the compliance assistant.
//!
//! Holds the append-only transcript for one session and the send flow: user
//! message in, backend reply out — or, when the backend is unreachable, a
//! canned keyword-matched reply after a fixed delay so the exchange still
//! reads naturally. The transcript lives in memory only and is never
//! persisted.

use std::thread;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiClient;
use crate::rules;

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only, in-memory message list.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Send flow
// ---------------------------------------------------------------------------

/// What a send produced.
#[derive(Debug)]
pub struct SendOutcome {
    pub reply: String,
    /// True when the backend was unreachable and a canned reply was used.
    pub fallback: bool,
}

/// One chat session bound to a client and a transcript.
pub struct ChatSession {
    client: ApiClient,
    transcript: Transcript,
    fallback_delay: Duration,
}

impl ChatSession {
    pub fn new(client: ApiClient, fallback_delay: Duration) -> Self {
        Self {
            client,
            transcript: Transcript::default(),
            fallback_delay,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Send a message. The user message is appended synchronously; exactly
    /// one assistant message follows — the backend reply, or after the
    /// fallback delay, the canned reply picked by keyword match.
    pub fn send(&mut self, message: &str, context: Option<&Value>) -> SendOutcome {
        self.transcript.push(ChatMessage::now(Role::User, message));

        let outcome = match self.client.chat(message, context) {
            Ok(reply) => SendOutcome {
                reply,
                fallback: false,
            },
            Err(_) => {
                // Let the typing indicator breathe before the canned answer.
                thread::sleep(self.fallback_delay);
                SendOutcome {
                    reply: rules::canned_reply(message).to_string(),
                    fallback: true,
                }
            }
        };

        self.transcript
            .push(ChatMessage::now(Role::Assistant, outcome.reply.clone()));
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ApiConfig;

    /// Client pointed at a port nothing listens on — every call fails fast.
    fn dead_client() -> ApiClient {
        ApiClient::from_config(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 300,
        })
    }

    #[test]
    fn network_failure_appends_exactly_one_canned_reply() {
        let mut session = ChatSession::new(dead_client(), Duration::ZERO);
        let outcome = session.send("How does encryption scoring work?", None);

        assert!(outcome.fallback);
        assert!(outcome.reply.contains("AES-256"));

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, outcome.reply);
    }

    #[test]
    fn transcript_is_append_only_across_sends() {
        let mut session = ChatSession::new(dead_client(), Duration::ZERO);
        session.send("first", None);
        session.send("second", None);

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[2].content, "second");
    }

    #[test]
    fn unmatched_message_gets_generic_fallback() {
        let mut session = ChatSession::new(dead_client(), Duration::ZERO);
        let outcome = session.send("zzz", None);
        assert_eq!(outcome.reply, rules::CANNED_DEFAULT);
    }
}
