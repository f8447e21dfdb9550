//! Conversation controller: the submit path.
//!
//! Wires the store's busy gate to a reply resolver. One user message and at
//! most one assistant message are appended per accepted submission, and the
//! busy flag always returns to false when the submission finishes.

use std::sync::Arc;

use adkar_core::types::{ConversationState, Message};

use crate::error::ChatError;
use crate::resolver::ReplyResolver;
use crate::store::ConversationStore;

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    Busy,
}

/// Result of [`ConversationController::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was appended and state is unchanged.
    Ignored(IgnoreReason),
    /// Both messages were appended, user first.
    Replied { user: Message, assistant: Message },
    /// The user message was appended but resolution failed; no reply was
    /// appended and the busy flag was cleared.
    Failed { user: Message, error: ChatError },
}

impl SubmitOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, SubmitOutcome::Replied { .. })
    }

    /// The assistant reply, when there is one.
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Replied { assistant, .. } => Some(assistant),
            _ => None,
        }
    }
}

/// Clears the busy flag on drop unless the exchange completed.
///
/// Covers a `submit` future dropped mid-resolution (timeout, `select!`,
/// task abort) as well as the failure path.
struct PendingExchange<'a> {
    store: &'a ConversationStore,
    completed: bool,
}

impl<'a> PendingExchange<'a> {
    fn new(store: &'a ConversationStore) -> Self {
        Self {
            store,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if !self.completed && self.store.abandon_exchange() {
            tracing::debug!("Pending exchange abandoned");
        }
    }
}

/// Composition root of the chat core.
pub struct ConversationController {
    store: Arc<ConversationStore>,
    resolver: Arc<dyn ReplyResolver>,
}

impl ConversationController {
    pub fn new(store: Arc<ConversationStore>, resolver: Arc<dyn ReplyResolver>) -> Self {
        Self { store, resolver }
    }

    /// Shared handle to the store, for renderers that poll snapshots.
    pub fn store(&self) -> Arc<ConversationStore> {
        Arc::clone(&self.store)
    }

    pub fn state(&self) -> ConversationState {
        self.store.current_state()
    }

    pub fn resolver_name(&self) -> &str {
        self.resolver.name()
    }

    /// Submit raw user input.
    ///
    /// Blank input and input arriving while a reply is pending are ignored.
    /// Otherwise the trimmed text is appended as a user message, resolved,
    /// and the reply appended. On resolution failure the exchange is
    /// abandoned: the user message stays, busy is cleared, no reply is added.
    /// Dropping the returned future mid-flight abandons the exchange too.
    pub async fn submit(&self, raw_input: &str) -> SubmitOutcome {
        let content = raw_input.trim();
        if content.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let user = match self.store.append_user(content) {
            Ok(message) => message,
            Err(_) => {
                tracing::debug!("Submission ignored while a reply is pending");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
        };
        let pending = PendingExchange::new(&self.store);

        let resolved = self.resolver.resolve(content).await;

        match resolved {
            Ok(reply) => match self.store.append_assistant(reply) {
                Ok(assistant) => {
                    pending.complete();
                    tracing::info!(
                        user_id = %user.id(),
                        assistant_id = %assistant.id(),
                        backend = self.resolver.name(),
                        "Reply appended"
                    );
                    SubmitOutcome::Replied { user, assistant }
                }
                Err(error) => {
                    tracing::error!(error = %error, "Pending exchange vanished before reply");
                    SubmitOutcome::Failed { user, error }
                }
            },
            Err(error) => {
                tracing::warn!(
                    user_id = %user.id(),
                    backend = self.resolver.name(),
                    error = %error,
                    "Reply resolution failed"
                );
                SubmitOutcome::Failed { user, error }
            }
        }
    }
}
