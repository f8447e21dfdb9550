//! Conversation core for the ADKAR assistant.
//!
//! Matches user text against an ordered keyword catalog (or a remote
//! text-generation backend), keeps the conversation history with its busy
//! gate, and forwards per-reply feedback to a sink.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod remote;
pub mod resolver;
pub mod sink;
pub mod store;

pub use catalog::{ReplyCatalog, ReplyRule};
pub use controller::{ConversationController, IgnoreReason, SubmitOutcome};
pub use error::ChatError;
pub use feedback::FeedbackRecorder;
pub use remote::RemoteResolver;
pub use resolver::{KeywordResolver, ReplyResolver};
pub use sink::{FeedbackSink, HttpFeedbackSink, JsonFileSink, LogSink};
pub use store::ConversationStore;
