//! Message adapters - convert between domain types and the OpenAI wire format

use crate::types::{ChatMessage, MessageRole, ToolCall, ToolSpec};
use serde_json::{Value, json};

/// Adapter for converting messages to and from the OpenAI format
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages.iter().map(Self::message_to_openai).collect()
    }

    fn message_to_openai(msg: &ChatMessage) -> Value {
        match msg.role {
            MessageRole::Assistant if msg.has_tool_calls() => {
                let calls: Vec<Value> = msg
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": Self::encode_arguments(&call.arguments),
                            }
                        })
                    })
                    .collect();
                let content = if msg.content.is_empty() {
                    Value::Null
                } else {
                    Value::String(msg.content.clone())
                };
                json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": calls,
                })
            }
            MessageRole::Tool => json!({
                "role": "tool",
                "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                "content": msg.content.clone(),
            }),
            role => json!({
                "role": role.as_str(),
                "content": msg.content.clone(),
            }),
        }
    }

    /// Convert tool specs to OpenAI function declarations
    pub fn tools_to_openai(tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                let mut function = json!({
                    "name": tool.name,
                    "parameters": tool.input_schema,
                });
                if let (Some(description), Some(map)) =
                    (tool.description.as_ref(), function.as_object_mut())
                {
                    map.insert("description".to_string(), json!(description));
                }
                json!({ "type": "function", "function": function })
            })
            .collect()
    }

    /// Build a domain tool call from the wire representation.
    ///
    /// `arguments` arrives as a JSON-encoded string; text that does not
    /// parse is kept as a plain JSON string.
    pub fn tool_call_from_openai(id: String, name: String, arguments: &str) -> ToolCall {
        let trimmed = arguments.trim();
        let arguments = if trimmed.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(arguments.to_string()))
        };
        ToolCall {
            id,
            name,
            arguments,
        }
    }

    fn encode_arguments(arguments: &Value) -> String {
        match arguments {
            Value::String(raw) => raw.clone(),
            Value::Null => "{}".to_string(),
            other => other.to_string(),
        }
    }
}
