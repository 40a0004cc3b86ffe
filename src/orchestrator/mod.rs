//! Core orchestration loop.
//!
//! The [`Orchestrator`] drives one conversation: it sends the transcript and
//! the registered function specs to the completion API, resolves
//! function-call responses by dispatching handlers and re-injecting their
//! results, and loops until the model produces a final text answer (or the
//! turn cap is reached). Between requests the loop is always in exactly one
//! of: awaiting a completion, deciding on its outcome, dispatching a
//! function, or finished with the turn.

use crate::api::{ApiClient, CompletionClient};
use crate::config::Config;
use crate::error::OrchestratorError;
use crate::registry::FunctionRegistry;
use crate::transcript::Transcript;
use crate::types::{ChatRequest, FinishReason, FunctionCall, FunctionCallPolicy, Message};
use tokio::sync::{mpsc, watch};

mod events;

pub use events::LoopEvent;

/// Function-result placeholder inserted when cancellation interrupts
/// handler execution, keeping the call/result pair consistent.
const CANCELLED_FUNCTION_RESULT: &str = "operation cancelled by user";

/// How one user turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced a final text answer.
    Answered(String),
    /// Generation stopped for a non-answer reason (truncation, content
    /// filter, a function-call finish with no payload). Whatever partial
    /// content arrived is passed through untouched; nothing is fabricated.
    Incomplete {
        reason: FinishReason,
        content: Option<String>,
    },
    /// The caller cancelled the turn.
    Cancelled,
}

/// The state machine orchestrating one conversation.
pub struct Orchestrator {
    /// Completion client implementation (HTTP client in prod, mocks in tests).
    client: Box<dyn CompletionClient>,
    /// Effective runtime settings.
    config: Config,
    /// Registered functions advertised to the model.
    registry: FunctionRegistry,
    /// Full conversation history sent on each request.
    transcript: Transcript,
    /// Request-level function-call policy.
    function_call: FunctionCallPolicy,
    /// Optional observer sink for transcript/dispatch milestones.
    event_sink: Option<mpsc::UnboundedSender<LoopEvent>>,
    /// Optional cancellation signal receiver for the in-flight turn.
    cancellation_rx: Option<watch::Receiver<bool>>,
}

impl Orchestrator {
    /// Create an orchestrator from configuration with functions
    /// pre-registered.
    pub fn new(config: Config, registry: FunctionRegistry) -> Self {
        let client = Box::new(ApiClient::new(
            &config.api,
            std::time::Duration::from_secs(config.network.api_timeout_secs),
        ));
        Self::with_client(config, registry, client)
    }

    /// Create an orchestrator with an explicit completion client.
    ///
    /// Used for deterministic testing and alternative backends.
    pub fn with_client(
        config: Config,
        registry: FunctionRegistry,
        client: Box<dyn CompletionClient>,
    ) -> Self {
        let transcript = initial_transcript(&config);
        Self {
            client,
            config,
            registry,
            transcript,
            function_call: FunctionCallPolicy::Auto,
            event_sink: None,
            cancellation_rx: None,
        }
    }

    /// Replace the request-level function-call policy.
    pub fn set_function_call_policy(&mut self, policy: FunctionCallPolicy) {
        self.function_call = policy;
    }

    /// Attach an observer sink; every transcript append and dispatch
    /// milestone is mirrored onto it.
    pub fn set_event_sink(&mut self, sink: Option<mpsc::UnboundedSender<LoopEvent>>) {
        self.event_sink = sink;
    }

    /// Register a cancellation signal for in-flight turns.
    pub fn set_cancellation_receiver(&mut self, rx: Option<watch::Receiver<bool>>) {
        self.cancellation_rx = rx;
    }

    /// Access the conversation history.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Access the function registry.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Reset conversation state to a fresh session (keeps config/functions).
    pub fn reset(&mut self) {
        self.transcript = initial_transcript(&self.config);
    }

    /// Return true when the current turn has been cancelled by the caller.
    fn cancellation_requested(&self) -> bool {
        self.cancellation_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Send a user message and run the loop until the model answers.
    ///
    /// Function calls are dispatched and their results re-submitted
    /// automatically until a terminal outcome is produced or the configured
    /// `max_turns` request cap is hit.
    pub async fn run_turn(&mut self, user_input: &str) -> Result<TurnOutcome, OrchestratorError> {
        self.append(Message::user(user_input))?;
        if self.cancellation_requested() {
            return Ok(TurnOutcome::Cancelled);
        }

        let mut turns = 0;

        loop {
            turns += 1;
            if turns > self.config.orchestrator.max_turns {
                return Err(OrchestratorError::TurnLimitReached);
            }

            let request = self.build_request();
            self.emit(LoopEvent::RequestStarted {
                model: request.model.clone(),
                turn: turns,
            });
            tracing::debug!(model = %request.model, turn = turns, "requesting completion");

            let response = if let Some(cancel_rx) = &self.cancellation_rx {
                let mut cancel_rx = cancel_rx.clone();
                tokio::select! {
                    // Cancellation wins immediately; nothing has been
                    // appended for this request yet.
                    _ = wait_for_cancellation(&mut cancel_rx) => {
                        return Ok(TurnOutcome::Cancelled);
                    }
                    response = self.client.complete(&request) => response?,
                }
            } else {
                self.client.complete(&request).await?
            };

            if let Some(usage) = &response.usage {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "token usage"
                );
            }

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(OrchestratorError::EmptyResponse)?;
            let finish_reason = choice.finish_reason;
            let mut message = choice.message;

            // The transcript is updated before any dispatch decision. When a
            // call payload is present the content is forced to null here;
            // some providers attach filler text the completions API would
            // reject on resend.
            if message.function_call.is_some() {
                message.content = None;
            }
            let call = message.function_call.clone();
            let content = message.content.clone();
            self.append(message)?;

            if let Some(call) = call {
                let cancelled = self.dispatch_call(&call).await?;
                if cancelled {
                    return Ok(TurnOutcome::Cancelled);
                }
                // Loop back and re-submit with the function result attached.
                continue;
            }

            return match finish_reason {
                Some(FinishReason::Stop) | None => {
                    Ok(TurnOutcome::Answered(content.unwrap_or_default()))
                }
                Some(reason) => {
                    tracing::warn!(?reason, "completion ended without a final answer");
                    Ok(TurnOutcome::Incomplete { reason, content })
                }
            };
        }
    }

    /// Execute one requested function call and append its result message.
    ///
    /// Dispatch failures (unknown name, argument validation) are reported
    /// back to the model as the result payload so it can retry with a
    /// corrected call; they never abort the session. Returns true when the
    /// turn was cancelled mid-dispatch.
    async fn dispatch_call(&mut self, call: &FunctionCall) -> Result<bool, OrchestratorError> {
        self.emit(LoopEvent::FunctionCallRequested {
            name: call.name.clone(),
            arguments_json: call.arguments.clone(),
        });
        tracing::debug!(function = %call.name, "dispatching function call");

        let mut cancelled = false;
        let result = if self.cancellation_requested() {
            cancelled = true;
            CANCELLED_FUNCTION_RESULT.to_string()
        } else if let Some(cancel_rx) = &self.cancellation_rx {
            let mut cancel_rx = cancel_rx.clone();
            tokio::select! {
                // If cancellation arrives while a handler runs, a synthetic
                // result still gets appended so the call/result pair stays
                // consistent.
                _ = wait_for_cancellation(&mut cancel_rx) => {
                    cancelled = true;
                    CANCELLED_FUNCTION_RESULT.to_string()
                }
                dispatched = self.registry.dispatch(&call.name, &call.arguments) => {
                    match dispatched {
                        Ok(output) => output,
                        Err(err) => {
                            tracing::warn!(function = %call.name, error = %err, "function dispatch failed");
                            format!("Function error: {err}")
                        }
                    }
                }
            }
        } else {
            match self.registry.dispatch(&call.name, &call.arguments).await {
                Ok(output) => output,
                Err(err) => {
                    tracing::warn!(function = %call.name, error = %err, "function dispatch failed");
                    format!("Function error: {err}")
                }
            }
        };

        self.append(Message::function_result(&call.name, &result))?;
        self.emit(LoopEvent::FunctionResult {
            name: call.name.clone(),
            result,
        });
        Ok(cancelled)
    }

    /// Build the next completion request from the full transcript and the
    /// registry's advertised specs.
    fn build_request(&self) -> ChatRequest {
        let functions = if self.registry.is_empty() {
            None
        } else {
            Some(self.registry.describe())
        };
        let function_call = functions.as_ref().map(|_| self.function_call.clone());
        ChatRequest {
            model: self.config.api.model.clone(),
            messages: self.transcript.messages().to_vec(),
            functions,
            function_call,
            temperature: self.config.orchestrator.temperature,
            top_p: self.config.orchestrator.top_p,
        }
    }

    /// Append to the transcript and mirror the message to observers.
    fn append(&mut self, message: Message) -> Result<(), OrchestratorError> {
        self.transcript.push(message.clone())?;
        self.emit(LoopEvent::MessageAppended(message));
        Ok(())
    }

    fn emit(&self, event: LoopEvent) {
        if let Some(sink) = &self.event_sink {
            let _ = sink.send(event);
        }
    }
}

/// Wait for cancellation signal state change (or return immediately if set).
async fn wait_for_cancellation(cancel_rx: &mut watch::Receiver<bool>) {
    if *cancel_rx.borrow() {
        return;
    }
    let _ = cancel_rx.changed().await;
}

/// Seed a transcript from the configured system prompt. Constructor-shaped
/// messages always satisfy the transcript checks.
fn initial_transcript(config: &Config) -> Transcript {
    let mut transcript = Transcript::new();
    if !config.orchestrator.system_prompt.trim().is_empty() {
        let _ = transcript.push(Message::system(&config.orchestrator.system_prompt));
    }
    transcript
}
