use std::sync::Arc;

use core_types::{ApiError, ChatMessage, ChatRequest, LegalApi, SessionId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::notify::Notifier;

pub const CHAT_APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";
pub const CHAT_FAILURE_NOTICE: &str = "Failed to get response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Blank after trimming.
    Empty,
    /// Another message is still awaiting its reply.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    Failed(ApiError),
    Rejected(RejectReason),
}

/// Generates the identifier for a new conversation.
pub fn create_session() -> SessionId {
    SessionId::generate()
}

#[derive(Debug)]
struct Transcript {
    state: ChatState,
    messages: Vec<ChatMessage>,
}

/// Returns the controller to `Idle` if a send is dropped before its reply
/// settles.
struct SendingGuard<'a> {
    transcript: &'a Mutex<Transcript>,
    session_id: &'a SessionId,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        let mut transcript = self.transcript.lock();
        if transcript.state == ChatState::Sending {
            debug!(session_id = %self.session_id, "send cancelled before reply");
            transcript.state = ChatState::Idle;
        }
    }
}

/// One conversation: its session id, the ordered transcript and the
/// single-flight send gate.
///
/// A send appends the user message and locks to `Sending` before the request
/// leaves; the reply (or the apology on failure) is appended when it settles.
/// Sends issued while `Sending` are rejected, never queued, so the transcript
/// order always equals send order.
pub struct ChatSessionController {
    api: Arc<dyn LegalApi>,
    notifier: Arc<dyn Notifier>,
    session_id: SessionId,
    transcript: Mutex<Transcript>,
}

impl ChatSessionController {
    pub fn new(api: Arc<dyn LegalApi>, notifier: Arc<dyn Notifier>) -> Self {
        let session_id = create_session();
        debug!(session_id = %session_id, "chat session created");
        Self {
            api,
            notifier,
            session_id,
            transcript: Mutex::new(Transcript {
                state: ChatState::Idle,
                messages: Vec::new(),
            }),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> ChatState {
        self.transcript.lock().state
    }

    pub fn is_sending(&self) -> bool {
        self.state() == ChatState::Sending
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().messages.clone()
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::Empty);
        }

        {
            let mut transcript = self.transcript.lock();
            if transcript.state == ChatState::Sending {
                debug!(session_id = %self.session_id, "send rejected while a reply is pending");
                return SendOutcome::Rejected(RejectReason::Busy);
            }
            transcript.messages.push(ChatMessage::user(text));
            transcript.state = ChatState::Sending;
        }
        let _sending = SendingGuard {
            transcript: &self.transcript,
            session_id: &self.session_id,
        };

        let request = ChatRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
        };
        let result = self.api.send_chat(&request).await;

        let outcome = {
            let mut transcript = self.transcript.lock();
            let outcome = match result {
                Ok(reply) => {
                    transcript.messages.push(ChatMessage::assistant(reply.response));
                    SendOutcome::Replied
                }
                Err(err) => {
                    warn!(session_id = %self.session_id, error = %err, "chat request failed");
                    transcript.messages.push(ChatMessage::assistant(CHAT_APOLOGY));
                    SendOutcome::Failed(err)
                }
            };
            transcript.state = ChatState::Idle;
            outcome
        };

        if matches!(outcome, SendOutcome::Failed(_)) {
            self.notifier.error(CHAT_FAILURE_NOTICE);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use core_types::{ChatReply, ChatRole};
    use futures::FutureExt;
    use tokio::sync::Notify;

    use super::*;
    use crate::testing::{FakeApi, RecordingNotifier, offline};

    fn controller(api: FakeApi) -> (ChatSessionController, Arc<FakeApi>, Arc<RecordingNotifier>) {
        let api = Arc::new(api);
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = ChatSessionController::new(api.clone(), notifier.clone());
        (controller, api, notifier)
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_assistant() {
        let fake = FakeApi::default();
        fake.chat.lock().push_back(Ok(ChatReply {
            response: "Due process means...".to_string(),
        }));
        let (chat, api, notifier) = controller(fake);

        let outcome = chat.send_message("What is due process?").await;

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(
            chat.messages(),
            vec![
                ChatMessage::user("What is due process?"),
                ChatMessage::assistant("Due process means..."),
            ]
        );
        assert_eq!(chat.state(), ChatState::Idle);
        assert!(notifier.messages().is_empty());

        let requests = api.chat_requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "What is due process?");
        assert_eq!(&requests[0].session_id, chat.session_id());
    }

    #[tokio::test]
    async fn failure_appends_apology_and_notifies() {
        let fake = FakeApi::default();
        fake.chat.lock().push_back(Err(ApiError::Timeout));
        let (chat, _api, notifier) = controller(fake);

        let outcome = chat.send_message("Hello?").await;

        assert_eq!(outcome, SendOutcome::Failed(ApiError::Timeout));
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("Hello?"));
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].content, CHAT_APOLOGY);
        assert_eq!(notifier.messages(), vec![CHAT_FAILURE_NOTICE.to_string()]);
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_request() {
        let (chat, api, _notifier) = controller(FakeApi::default());

        assert_eq!(
            chat.send_message("   \n").await,
            SendOutcome::Rejected(RejectReason::Empty)
        );
        assert!(chat.messages().is_empty());
        assert!(api.chat_requests.lock().is_empty());
    }

    #[tokio::test]
    async fn send_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let fake = FakeApi::gated(gate.clone());
        fake.chat.lock().push_back(Ok(ChatReply {
            response: "first answer".to_string(),
        }));
        let (chat, api, _notifier) = controller(fake);

        let (first, second) = futures::join!(chat.send_message("first"), async {
            assert_eq!(chat.state(), ChatState::Sending);
            assert_eq!(chat.messages(), vec![ChatMessage::user("first")]);
            let second = chat.send_message("second").await;
            gate.notify_one();
            second
        });

        assert_eq!(first, SendOutcome::Replied);
        assert_eq!(second, SendOutcome::Rejected(RejectReason::Busy));
        assert_eq!(
            chat.messages(),
            vec![
                ChatMessage::user("first"),
                ChatMessage::assistant("first answer"),
            ]
        );
        assert_eq!(api.chat_requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_send_does_not_leave_controller_busy() {
        let gate = Arc::new(Notify::new());
        let fake = FakeApi::gated(gate.clone());
        fake.chat.lock().push_back(Ok(ChatReply {
            response: "second answer".to_string(),
        }));
        let (chat, _api, _notifier) = controller(fake);

        assert!(chat.send_message("first").now_or_never().is_none());
        assert_eq!(chat.state(), ChatState::Idle);

        gate.notify_one();
        assert_eq!(chat.send_message("second").await, SendOutcome::Replied);
        assert_eq!(chat.messages().last(), Some(&ChatMessage::assistant("second answer")));
    }

    #[tokio::test]
    async fn failed_message_stays_and_next_send_is_accepted() {
        let fake = FakeApi::default();
        fake.chat.lock().push_back(Err(offline()));
        fake.chat.lock().push_back(Ok(ChatReply {
            response: "Back online".to_string(),
        }));
        let (chat, _api, _notifier) = controller(fake);

        chat.send_message("one").await;
        chat.send_message("two").await;

        let contents: Vec<String> = chat.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", CHAT_APOLOGY, "two", "Back online"]);
    }

    #[test]
    fn each_controller_gets_its_own_session() {
        let api: Arc<dyn LegalApi> = Arc::new(FakeApi::default());
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        let first = ChatSessionController::new(api.clone(), notifier.clone());
        let second = ChatSessionController::new(api, notifier);
        assert_ne!(first.session_id(), second.session_id());
    }
}
