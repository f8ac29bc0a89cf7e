// src/chat/session.rs
//! Chat flow state machine: `Uninitialized → Ready → (message loop) → Ready`,
//! reset whenever the subject changes. At most one session is live; opening a
//! new subject discards the prior session and its history entirely.

use tracing::{error, info};
use uuid::Uuid;

use super::{GenerativeBackend, Message};

/// Fallback assistant text appended when the upstream call fails. Failures
/// never propagate to the caller.
pub const FALLBACK_REPLY: &str = "Something went wrong. Please try again.";

/// Conversation state for one subject. Turns are replayed to the upstream on
/// every send so earlier exchanges stay in scope.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub subject: String,
    system_instruction: String,
    turns: Vec<Message>,
}

impl ChatSession {
    fn new(subject: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            system_instruction: priming_instruction(subject),
            turns: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }
}

fn priming_instruction(subject: &str) -> String {
    format!(
        "You are an assistant knowledgeable about charities. You will provide users with \
         information about whichever charity or donation location you are given. If you have \
         absolutely no information on the location, attempt to infer what they do from their \
         name rather than defaulting to other sources. If you believe it is a local business, \
         say that it is likely a local business and suggest visiting their website or other \
         means of contacting them if interested in donating. \
         Please provide information specifically about the charity named {subject}."
    )
}

#[derive(Debug)]
enum ChatState {
    Uninitialized,
    Ready { session: ChatSession },
}

/// Outcome of a single `send`, for callers that want to react (e.g. scroll
/// the log or surface nothing at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty/whitespace input or no live session; nothing happened.
    Ignored,
    /// Upstream replied; the assistant message is in the log.
    Replied,
    /// Upstream failed; the fallback assistant message is in the log.
    Failed,
}

pub struct ChatFlow<B: GenerativeBackend> {
    backend: B,
    state: ChatState,
    messages: Vec<Message>,
}

impl<B: GenerativeBackend> ChatFlow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ChatState::Uninitialized,
            messages: Vec::new(),
        }
    }

    /// The display log for the current session. Cleared on `open` and `close`.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session(&self) -> Option<&ChatSession> {
        match &self.state {
            ChatState::Ready { session } => Some(session),
            ChatState::Uninitialized => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ChatState::Ready { .. })
    }

    /// Start a fresh session for `subject`, discarding any prior session and
    /// log, and greet the user.
    pub fn open(&mut self, subject: &str) {
        let session = ChatSession::new(subject);
        info!(subject, session_id = %session.id, "opening chat session");

        self.messages.clear();
        self.messages.push(Message::assistant(format!(
            "What would you like to know about {subject}?"
        )));
        self.state = ChatState::Ready { session };
    }

    /// Drop the session and log, returning to `Uninitialized`.
    pub fn close(&mut self) {
        self.state = ChatState::Uninitialized;
        self.messages.clear();
    }

    /// Relay one user message. Empty/whitespace input and sends before `open`
    /// are silently ignored; upstream failure appends `FALLBACK_REPLY`.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        let session = match &mut self.state {
            ChatState::Ready { session } => session,
            ChatState::Uninitialized => return SendOutcome::Ignored,
        };

        self.messages.push(Message::user(text));

        let result = self
            .backend
            .generate(&session.system_instruction, &session.turns, text)
            .await;

        match result {
            Ok(reply) => {
                session.turns.push(Message::user(text));
                session.turns.push(Message::assistant(reply.clone()));
                self.messages.push(Message::assistant(reply));
                SendOutcome::Replied
            }
            Err(cause) => {
                error!(subject = %session.subject, %cause, "chat upstream failure");
                self.messages.push(Message::assistant(FALLBACK_REPLY));
                SendOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted backend: records every call, pops replies front-to-back, and
    /// fails once the script runs out.
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<String, String>>>,
        calls: Mutex<Vec<(String, usize, String)>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, usize, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeBackend for &ScriptedBackend {
        async fn generate(&self, system: &str, history: &[Message], input: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), history.len(), input.to_string()));
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                anyhow::bail!("script exhausted");
            }
            replies.remove(0).map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[tokio::test]
    async fn open_greets_with_subject() {
        let backend = ScriptedBackend::new(vec![]);
        let mut flow = ChatFlow::new(&backend);

        assert!(!flow.is_ready());
        flow.open("Red Cross");

        assert!(flow.is_ready());
        assert_eq!(flow.messages().len(), 1);
        assert_eq!(flow.messages()[0].sender, Sender::Assistant);
        assert!(flow.messages()[0].text.contains("Red Cross"));
        assert!(flow.session().unwrap().system_instruction().contains("Red Cross"));
    }

    #[tokio::test]
    async fn empty_send_is_a_no_op() {
        let backend = ScriptedBackend::new(vec![Ok("unused".into())]);
        let mut flow = ChatFlow::new(&backend);
        flow.open("Red Cross");
        let before = flow.messages().len();

        assert_eq!(flow.send("").await, SendOutcome::Ignored);
        assert_eq!(flow.send("   \t\n").await, SendOutcome::Ignored);

        assert_eq!(flow.messages().len(), before);
        assert!(backend.calls().is_empty(), "upstream must not be called");
    }

    #[tokio::test]
    async fn send_before_open_is_a_no_op() {
        let backend = ScriptedBackend::new(vec![Ok("unused".into())]);
        let mut flow = ChatFlow::new(&backend);

        assert_eq!(flow.send("hello").await, SendOutcome::Ignored);
        assert!(flow.messages().is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn send_appends_user_then_assistant() {
        let backend = ScriptedBackend::new(vec![Ok("They run a shelter.".into())]);
        let mut flow = ChatFlow::new(&backend);
        flow.open("Hope Shelter");

        assert_eq!(flow.send("What do they do?").await, SendOutcome::Replied);

        let log = flow.messages();
        assert_eq!(log.len(), 3); // greeting + user + assistant
        assert_eq!(log[1], Message::user("What do they do?"));
        assert_eq!(log[2], Message::assistant("They run a shelter."));
    }

    #[tokio::test]
    async fn history_replay_grows_turn_by_turn() {
        let backend = ScriptedBackend::new(vec![Ok("First.".into()), Ok("Second.".into())]);
        let mut flow = ChatFlow::new(&backend);
        flow.open("Hope Shelter");

        flow.send("one").await;
        flow.send("two").await;

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, 0, "first send carries no prior turns");
        assert_eq!(calls[1].1, 2, "second send replays the first exchange");
    }

    #[tokio::test]
    async fn upstream_failure_appends_fallback() {
        let backend = ScriptedBackend::new(vec![Err("boom".into())]);
        let mut flow = ChatFlow::new(&backend);
        flow.open("Hope Shelter");

        assert_eq!(flow.send("hi").await, SendOutcome::Failed);

        let log = flow.messages();
        assert_eq!(log[1], Message::user("hi"));
        assert_eq!(log[2], Message::assistant(FALLBACK_REPLY));
        // The failed exchange is not replayed on the next send.
        assert!(flow.session().unwrap().turns().is_empty());
    }

    #[tokio::test]
    async fn subject_change_discards_prior_session() {
        let backend = ScriptedBackend::new(vec![Ok("About A.".into()), Ok("About B.".into())]);
        let mut flow = ChatFlow::new(&backend);

        flow.open("Charity A");
        flow.send("tell me about them").await;
        let first_id = flow.session().unwrap().id;

        flow.open("Charity B");
        let session = flow.session().unwrap();
        assert_ne!(session.id, first_id);
        assert!(session.turns().is_empty(), "no history crosses subjects");
        assert_eq!(flow.messages().len(), 1, "log resets to the greeting");

        flow.send("and these folks?").await;
        let calls = backend.calls();
        let last = calls.last().unwrap();
        assert!(last.0.contains("Charity B"), "fresh priming instruction");
        assert!(!last.0.contains("Charity A"));
        assert_eq!(last.1, 0, "no prior turns leak across subjects");
    }

    #[tokio::test]
    async fn close_returns_to_uninitialized() {
        let backend = ScriptedBackend::new(vec![]);
        let mut flow = ChatFlow::new(&backend);
        flow.open("Charity A");

        flow.close();
        assert!(!flow.is_ready());
        assert!(flow.messages().is_empty());
        assert_eq!(flow.send("anyone there?").await, SendOutcome::Ignored);
    }
}
