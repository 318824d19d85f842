//! Request and response types for the two wire protocols.
//!
//! Extraction backends have changed response shape across versions without
//! warning, so every envelope keeps its raw `usage` object as JSON and
//! accepts both snake_case and camelCase spellings where drift has been
//! observed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Messages
// =============================================================================

/// A single prompt message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// =============================================================================
// Chat completions protocol
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in the completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Output-format hint ({"type": "json_object"})
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max completion tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON object response.
    pub fn json_output(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

/// Response format hint for chat requests.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat completion response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEnvelope {
    /// Provider-assigned response id
    #[serde(default)]
    pub id: Option<String>,

    /// Model that produced the completion
    #[serde(default)]
    pub model: Option<String>,

    /// Completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    /// Raw usage object, normalized downstream
    #[serde(default)]
    pub usage: Option<Value>,
}

impl ChatEnvelope {
    /// Text of the first choice, if the envelope carries one.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// One completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// The completion message
    pub message: ChatChoiceMessage,

    /// Why generation stopped ("stop", "length", ...)
    #[serde(default, alias = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Message body inside a chat choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    /// Completion text; absent for pure tool-call responses
    #[serde(default)]
    pub content: Option<String>,
}

// =============================================================================
// Responses protocol
// =============================================================================

/// Responses-API request.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    /// Model to use
    pub model: String,

    /// Input messages
    pub input: Vec<Message>,

    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl ResponsesRequest {
    /// Create a new responses request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: Vec::new(),
            max_output_tokens: None,
        }
    }

    /// Add an input message.
    pub fn message(mut self, message: Message) -> Self {
        self.input.push(message);
        self
    }

    /// Set max output tokens.
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Responses-API envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesEnvelope {
    /// Provider-assigned response id
    #[serde(default)]
    pub id: Option<String>,

    /// Model that produced the response
    #[serde(default)]
    pub model: Option<String>,

    /// Convenience field carrying the concatenated output text
    #[serde(default, alias = "outputText")]
    pub output_text: Option<String>,

    /// Structured output items
    #[serde(default)]
    pub output: Vec<OutputItem>,

    /// Raw usage object, normalized downstream
    #[serde(default)]
    pub usage: Option<Value>,
}

impl ResponsesEnvelope {
    /// Output text, preferring the convenience field and falling back to
    /// walking the nested content array.
    pub fn text(&self) -> Option<String> {
        if let Some(text) = &self.output_text {
            if !text.is_empty() {
                return Some(text.clone());
            }
        }

        let joined: String = self
            .output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// One output item (typically a "message").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputItem {
    /// Item kind ("message", "reasoning", ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Content parts
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

/// One content part of an output item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputContent {
    /// Part kind ("output_text", ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Text payload
    #[serde(default)]
    pub text: Option<String>,
}
