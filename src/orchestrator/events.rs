//! Observer events emitted by the orchestration loop.
//!
//! Presentation layers subscribe to these instead of polling the transcript;
//! the stream is observational only and never feeds back into control flow.

use crate::types::Message;

/// One milestone in the life of a conversation turn.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// A message was appended to the transcript (user input, model output,
    /// or a function result).
    MessageAppended(Message),
    /// A completion request is about to be issued.
    RequestStarted {
        model: String,
        /// 1-based request count within the current user turn.
        turn: usize,
    },
    /// The model asked for a function invocation.
    FunctionCallRequested {
        name: String,
        arguments_json: String,
    },
    /// A dispatched function produced its result payload (or error text).
    FunctionResult { name: String, result: String },
}
