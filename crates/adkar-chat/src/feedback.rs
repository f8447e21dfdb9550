//! Feedback capture for assistant replies.

use std::sync::Arc;

use adkar_core::types::{Feedback, FeedbackCategory, MessageId, RATING_MAX};

use crate::error::ChatError;
use crate::sink::FeedbackSink;

/// Builds [`Feedback`] records and hands them to a sink.
///
/// Independent of the conversation's busy gate: it only references past
/// messages by id and never touches conversation state.
#[derive(Clone)]
pub struct FeedbackRecorder {
    sink: Arc<dyn FeedbackSink>,
}

impl FeedbackRecorder {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Record feedback for `message_id`.
    ///
    /// `rating` is 1..=5, or 0 for "unset"; anything above 5 is rejected
    /// before the sink is called. Unknown category ids pass through. Sink
    /// failures come back as [`ChatError::Sink`] and are not retried.
    pub async fn record(
        &self,
        message_id: MessageId,
        rating: u8,
        categories: Vec<String>,
        comment: impl Into<String>,
    ) -> Result<Feedback, ChatError> {
        if rating > RATING_MAX {
            return Err(ChatError::InvalidRating(rating));
        }
        for unknown in categories.iter().filter(|c| !FeedbackCategory::is_known(c)) {
            tracing::debug!(category = %unknown, "Unknown feedback category");
        }

        let feedback = Feedback {
            message_id,
            rating,
            categories,
            comment: comment.into(),
        };

        match self.sink.submit(&feedback).await {
            Ok(()) => {
                tracing::info!(
                    message_id = %message_id,
                    rating,
                    sink = self.sink.name(),
                    "Feedback recorded"
                );
                Ok(feedback)
            }
            Err(e) => {
                tracing::warn!(
                    message_id = %message_id,
                    sink = self.sink.name(),
                    error = %e,
                    "Feedback submission failed"
                );
                Err(match e {
                    ChatError::Sink(msg) => ChatError::Sink(msg),
                    other => ChatError::Sink(other.to_string()),
                })
            }
        }
    }
}
