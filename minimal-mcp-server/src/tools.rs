use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("missing required argument '{argument}'")]
    MissingArgument { argument: &'static str },
    #[error("argument '{argument}' must be a {expected}")]
    InvalidArgument {
        argument: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CalculateSum,
    ReverseString,
    GetCurrentTime,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::CalculateSum, Tool::ReverseString, Tool::GetCurrentTime];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::CalculateSum => "calculate_sum",
            Tool::ReverseString => "reverse_string",
            Tool::GetCurrentTime => "get_current_time",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::CalculateSum => "Add two numbers",
            Tool::ReverseString => "Reverse a string",
            Tool::GetCurrentTime => "Get the current time in ISO 8601 format (UTC)",
        }
    }

    pub fn input_schema(self) -> Value {
        let properties = match self {
            Tool::CalculateSum => json!({
                "a": { "type": "number", "description": "First number" },
                "b": { "type": "number", "description": "Second number" }
            }),
            Tool::ReverseString => json!({
                "text": { "type": "string", "description": "Text to reverse" }
            }),
            Tool::GetCurrentTime => json!({}),
        };
        let required: Vec<&str> = properties
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    /// Entry for a `tools/list` result.
    pub fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema()
        })
    }

    pub fn invoke(self, arguments: &Value) -> Result<String, ToolCallError> {
        match self {
            Tool::CalculateSum => {
                let a = number_arg(arguments, "a")?;
                let b = number_arg(arguments, "b")?;
                Ok(format!(
                    "The sum of {} and {} is {}",
                    js_number(a),
                    js_number(b),
                    js_number(a + b)
                ))
            }
            Tool::ReverseString => {
                let text = string_arg(arguments, "text")?;
                let reversed: String = text.chars().rev().collect();
                Ok(format!("Reversed text: {reversed}"))
            }
            Tool::GetCurrentTime => Ok(format!(
                "Current time: {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            )),
        }
    }
}

/// Render a number the way a JavaScript client prints it: no `-0`,
/// named non-finite values, and exponents outside `[1e-6, 1e21)`.
fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity");
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let rendered = format!("{value:e}");
        return match rendered.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => rendered,
        };
    }
    value.to_string()
}

fn number_arg(arguments: &Value, argument: &'static str) -> Result<f64, ToolCallError> {
    match arguments.get(argument) {
        None | Some(Value::Null) => Err(ToolCallError::MissingArgument { argument }),
        Some(value) => value.as_f64().ok_or(ToolCallError::InvalidArgument {
            argument,
            expected: "number",
        }),
    }
}

fn string_arg<'a>(arguments: &'a Value, argument: &'static str) -> Result<&'a str, ToolCallError> {
    match arguments.get(argument) {
        None | Some(Value::Null) => Err(ToolCallError::MissingArgument { argument }),
        Some(value) => value.as_str().ok_or(ToolCallError::InvalidArgument {
            argument,
            expected: "string",
        }),
    }
}
