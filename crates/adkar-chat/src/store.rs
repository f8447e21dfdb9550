//! Conversation history and busy gate.
//!
//! The store owns the single [`ConversationState`] of a session. History is
//! append-only; the busy flag is set by a user append and cleared by the
//! matching assistant append (or by abandoning the exchange).

use std::sync::{Mutex, MutexGuard};

use adkar_core::types::{ConversationState, Message, MessageId};

use crate::error::ChatError;

/// Owner of the conversation state. Share it behind an `Arc`; every method
/// takes `&self` and the lock is never held across an await.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: Mutex<ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and mark the conversation busy.
    ///
    /// Fails with [`ChatError::Busy`] if a reply is already pending. The
    /// check and the flag update happen under one lock.
    pub fn append_user(&self, content: impl Into<String>) -> Result<Message, ChatError> {
        let mut state = self.lock();
        if state.busy {
            return Err(ChatError::Busy);
        }
        let message = Message::user(content);
        state.messages.push(message.clone());
        state.busy = true;
        tracing::debug!(message_id = %message.id(), "User message appended");
        Ok(message)
    }

    /// Append the assistant reply and clear the busy flag.
    ///
    /// Fails with [`ChatError::NoPendingExchange`] when no user message is
    /// waiting for a reply.
    pub fn append_assistant(&self, content: impl Into<String>) -> Result<Message, ChatError> {
        let mut state = self.lock();
        if !state.busy {
            return Err(ChatError::NoPendingExchange);
        }
        let message = Message::assistant(content);
        state.messages.push(message.clone());
        state.busy = false;
        tracing::debug!(message_id = %message.id(), "Assistant message appended");
        Ok(message)
    }

    /// Clear the busy flag without appending a reply.
    ///
    /// Returns whether an exchange was actually pending.
    pub fn abandon_exchange(&self) -> bool {
        let mut state = self.lock();
        std::mem::replace(&mut state.busy, false)
    }

    /// Snapshot of the current state.
    pub fn current_state(&self) -> ConversationState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.lock().messages.iter().find(|m| m.id() == id).cloned()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.lock().messages.iter().any(|m| m.id() == id)
    }

    // A panic while holding the lock cannot leave the state half-written:
    // every mutation is a single push plus a flag write.
    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Conversation state lock poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adkar_core::types::Role;

    // ---- Appends ----

    #[test]
    fn test_new_store_is_empty_and_idle() {
        let store = ConversationStore::new();
        assert!(store.is_empty());
        assert!(!store.is_busy());
        assert_eq!(store.current_state(), ConversationState::default());
    }

    #[test]
    fn test_append_user_sets_busy() {
        let store = ConversationStore::new();
        let msg = store.append_user("hello").unwrap();
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "hello");
        assert!(store.is_busy());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_assistant_clears_busy() {
        let store = ConversationStore::new();
        store.append_user("hello").unwrap();
        let reply = store.append_assistant("hi there").unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert!(!store.is_busy());

        let state = store.current_state();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role(), Role::User);
        assert_eq!(state.messages[1].role(), Role::Assistant);
    }

    // ---- Busy gate ----

    #[test]
    fn test_append_user_while_busy_is_rejected() {
        let store = ConversationStore::new();
        store.append_user("first").unwrap();
        let err = store.append_user("second").unwrap_err();
        assert!(matches!(err, ChatError::Busy));
        assert_eq!(store.len(), 1);
        assert!(store.is_busy());
    }

    #[test]
    fn test_append_assistant_without_pending_is_rejected() {
        let store = ConversationStore::new();
        let err = store.append_assistant("orphan").unwrap_err();
        assert!(matches!(err, ChatError::NoPendingExchange));
        assert!(store.is_empty());
    }

    #[test]
    fn test_abandon_exchange_clears_busy_keeps_history() {
        let store = ConversationStore::new();
        store.append_user("question").unwrap();
        assert!(store.abandon_exchange());
        assert!(!store.is_busy());
        assert_eq!(store.len(), 1);
        // Nothing pending the second time.
        assert!(!store.abandon_exchange());
        // A new exchange can start.
        store.append_user("again").unwrap();
        assert_eq!(store.len(), 2);
    }

    // ---- Identity ----

    #[test]
    fn test_ids_unique_and_lookup_works() {
        let store = ConversationStore::new();
        let u = store.append_user("q").unwrap();
        let a = store.append_assistant("a").unwrap();
        assert_ne!(u.id(), a.id());
        assert!(store.contains(u.id()));
        assert_eq!(store.get(a.id()).unwrap().content(), "a");
        assert!(!store.contains(MessageId::new()));
        assert!(store.get(MessageId::new()).is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ConversationStore::new();
        store.append_user("q").unwrap();
        let snapshot = store.current_state();
        store.append_assistant("a").unwrap();
        assert_eq!(snapshot.messages.len(), 1);
        assert!(snapshot.busy);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_user_appends_admit_exactly_one() {
        use std::sync::Arc;

        let store = Arc::new(ConversationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.append_user(format!("msg {}", i)).is_ok())
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(store.len(), 1);
    }
}
