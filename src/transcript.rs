//! Append-only conversation history.
//!
//! The transcript is resent in full on every completion request, so insertion
//! order is load-bearing. Shape rules that the completions API enforces only
//! at request time (notably: a pending function call must carry null content)
//! are checked here at append time instead, turning caller mistakes into
//! immediate [`InvariantViolation`]s rather than deferred API rejections.

use crate::error::InvariantViolation;
use crate::types::{Message, Role};

/// Ordered, append-only sequence of conversation messages.
///
/// Entries are never reordered or deleted; corrections happen by appending
/// new messages. A transcript lives for one session and is not persisted.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message after validating its shape.
    ///
    /// Violations are programming errors in the caller; the transcript is
    /// left untouched when one is reported.
    pub fn push(&mut self, message: Message) -> Result<(), InvariantViolation> {
        self.check(&message)?;
        self.messages.push(message);
        Ok(())
    }

    fn check(&self, message: &Message) -> Result<(), InvariantViolation> {
        if message.function_call.is_some() {
            if message.role != Role::Assistant {
                return Err(InvariantViolation(
                    "only assistant messages may carry a function call".into(),
                ));
            }
            if message.content.is_some() {
                return Err(InvariantViolation(
                    "a pending function call must have null content".into(),
                ));
            }
        }

        match message.role {
            Role::System | Role::User => {
                if message.content.is_none() {
                    return Err(InvariantViolation(format!(
                        "{} messages require content",
                        message.role
                    )));
                }
            }
            Role::Function => {
                let Some(name) = message.name.as_deref() else {
                    return Err(InvariantViolation(
                        "function result messages require a function name".into(),
                    ));
                };
                if message.content.is_none() {
                    return Err(InvariantViolation(
                        "function result messages require content".into(),
                    ));
                }
                // A result must answer a call the assistant actually made.
                let requested = self.messages.iter().any(|m| {
                    m.function_call
                        .as_ref()
                        .is_some_and(|call| call.name == name)
                });
                if !requested {
                    return Err(InvariantViolation(format!(
                        "function result `{name}` has no preceding function call"
                    )));
                }
            }
            Role::Assistant => {}
        }

        Ok(())
    }

    /// Full history in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
