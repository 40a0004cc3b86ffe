//! Data model for the OpenAI chat completions function-calling protocol.
//!
//! These types serialize/deserialize directly to/from the JSON payloads
//! expected by any OpenAI-compatible endpoint that speaks the
//! `functions` / `function_call` wire shape.

use crate::schema::FunctionSpec;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Message roles
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction message.
    System,
    /// End-user message.
    User,
    /// Assistant/model message.
    Assistant,
    /// Function execution result message.
    Function,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Author role for this conversation turn.
    pub role: Role,

    /// Text content. Serialized as JSON `null` (never omitted) when the
    /// assistant message is purely a function call; the completions API
    /// rejects messages with the field missing entirely.
    #[serde(default)]
    pub content: Option<String>,

    /// When role == Function, the name of the function this result reports on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Function invocation requested by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    /// Create an assistant text message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    /// Create an assistant message that requests a function invocation.
    ///
    /// Content is forced to `None` here so the null-content rule holds by
    /// construction rather than by caller discipline.
    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            name: None,
            function_call: Some(call),
        }
    }

    /// Create a function result message, sent back after executing a call.
    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: Some(content.into()),
            name: Some(name.into()),
            function_call: None,
        }
    }
}

/// The function name and JSON-encoded arguments the model asked to invoke.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// Function name to execute.
    pub name: String,
    /// JSON-encoded string of the arguments object, not yet validated.
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// Finish reasons
// ---------------------------------------------------------------------------

/// Why the model stopped generating this choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Ordinary end of a text answer.
    Stop,
    /// The model is requesting a function invocation.
    FunctionCall,
    /// Generation was truncated at the token limit.
    Length,
    /// Content was withheld by the provider's filter.
    ContentFilter,
    /// Any reason string this crate does not recognize.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Function-call policy
// ---------------------------------------------------------------------------

/// Request-level control over whether the model may call functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionCallPolicy {
    /// The model decides between answering and calling.
    Auto,
    /// Function calling is disabled for this request.
    None,
    /// The model must call the named function.
    Forced(String),
}

impl Serialize for FunctionCallPolicy {
    // Wire shape: "auto" | "none" | {"name": "..."}.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::None => serializer.serialize_str("none"),
            Self::Forced(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("name", name)?;
                map.end()
            }
        }
    }
}

impl Default for FunctionCallPolicy {
    fn default() -> Self {
        Self::Auto
    }
}

// ---------------------------------------------------------------------------
// Chat completion request / response
// ---------------------------------------------------------------------------

/// Request body for POST /chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier used for request routing.
    pub model: String,
    /// Conversation history sent to the model.
    pub messages: Vec<Message>,

    /// Advertised function specs; omitted entirely when none are registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Response body from POST /chat/completions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Provider response id.
    pub id: String,
    /// Ranked response choices.
    pub choices: Vec<Choice>,
    /// Optional token usage metadata.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in the API response: one candidate message plus the
/// reason generation stopped.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Choice index in the provider response.
    pub index: u32,
    /// Assistant message payload for this choice.
    pub message: Message,
    /// Provider stop reason.
    pub finish_reason: Option<FinishReason>,
}

impl Choice {
    /// True when this choice asks the caller to execute a function, either
    /// by finish reason or by the presence of a call payload.
    pub fn is_function_call(&self) -> bool {
        self.finish_reason == Some(FinishReason::FunctionCall)
            || self.message.function_call.is_some()
    }
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Input tokens consumed by the request.
    pub prompt_tokens: u64,
    /// Output tokens generated by the model.
    pub completion_tokens: u64,
    /// Total tokens (`prompt + completion`).
    pub total_tokens: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Verifies optional fields are omitted when absent during request serialization.
    #[test]
    fn serialize_chat_request() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![
                Message::system("You are a helpful weather assistant."),
                Message::user("What's the weather like today?"),
            ],
            functions: None,
            function_call: None,
            temperature: Some(0.7),
            top_p: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["temperature"], 0.7);
        // top_p should be omitted
        assert!(json.get("top_p").is_none());
        // functions and function_call should be omitted
        assert!(json.get("functions").is_none());
        assert!(json.get("function_call").is_none());
    }

    // Verifies a pending function-call message serializes content as null,
    // never omitting the field.
    #[test]
    fn function_call_message_serializes_null_content() {
        let msg = Message::function_call(FunctionCall {
            name: "get_current_weather".into(),
            arguments: r#"{"location":"Glasgow, Scotland","unit":"celsius"}"#.into(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.as_object().unwrap().contains_key("content"));
        assert!(json["content"].is_null());
        assert_eq!(json["function_call"]["name"], "get_current_weather");
        // name is absent on assistant messages
        assert!(json.get("name").is_none());
    }

    #[test]
    fn function_call_policy_wire_shapes() {
        assert_eq!(
            serde_json::to_value(FunctionCallPolicy::Auto).unwrap(),
            serde_json::json!("auto")
        );
        assert_eq!(
            serde_json::to_value(FunctionCallPolicy::None).unwrap(),
            serde_json::json!("none")
        );
        assert_eq!(
            serde_json::to_value(FunctionCallPolicy::Forced("get_current_weather".into()))
                .unwrap(),
            serde_json::json!({"name": "get_current_weather"})
        );
    }

    // Verifies standard assistant text responses deserialize correctly.
    #[test]
    fn deserialize_chat_response() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Could you tell me your location?"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, "chatcmpl-123");
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].finish_reason, Some(FinishReason::Stop));
        assert!(!resp.choices[0].is_function_call());
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 15);
    }

    // Verifies function-call responses deserialize with null content.
    #[test]
    fn deserialize_function_call_response() {
        let json = r#"{
            "id": "chatcmpl-456",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": {
                        "name": "get_current_weather",
                        "arguments": "{\"location\":\"Glasgow, Scotland\",\"unit\":\"celsius\"}"
                    }
                },
                "finish_reason": "function_call"
            }]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let choice = &resp.choices[0];
        assert!(choice.message.content.is_none());
        assert!(choice.is_function_call());
        let call = choice.message.function_call.as_ref().unwrap();
        assert_eq!(call.name, "get_current_weather");
        assert!(call.arguments.contains("celsius"));
    }

    // Verifies unrecognized finish reasons fold into Other instead of failing.
    #[test]
    fn unknown_finish_reason_folds_into_other() {
        let json = r#"{
            "id": "chatcmpl-789",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "partial" },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].finish_reason, Some(FinishReason::Other));
    }

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content.as_deref(), Some("hello"));

        let usr = Message::user("world");
        assert_eq!(usr.role, Role::User);

        let result = Message::function_result("get_current_weather", "{\"unit\":\"celsius\"}");
        assert_eq!(result.role, Role::Function);
        assert_eq!(result.name.as_deref(), Some("get_current_weather"));
        assert!(result.content.is_some());

        let call = Message::function_call(FunctionCall {
            name: "get_current_weather".into(),
            arguments: "{}".into(),
        });
        assert_eq!(call.role, Role::Assistant);
        assert!(call.content.is_none());
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::Function.to_string(), "function");
    }
}
