use super::ToolRuntime;
use crate::application::agent::context::ToolCatalogue;
use crate::application::agent::errors::ToolError;
use crate::types::ToolCall;
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub tool: String,
    pub success: bool,
    pub input: Value,
    pub output: Value,
    pub message: Option<String>,
}

impl ToolExecution {
    fn rejected(tool: &str, input: Value, message: String) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            input,
            output: Value::Null,
            message: Some(message),
        }
    }

    /// Text handed back to the model for this call.
    pub fn observation(&self) -> String {
        let text = match (&self.message, &self.output) {
            (Some(message), _) => message.clone(),
            (None, Value::Null) => "(no output)".to_string(),
            (None, output) => output.to_string(),
        };
        if self.success {
            text
        } else {
            format!("Error: {text}")
        }
    }
}

impl ToolRuntime {
    /// Run one model-requested tool call.
    ///
    /// Mistakes the model can correct come back as failed executions;
    /// transport failures are errors.
    pub async fn execute(
        &self,
        catalogue: &ToolCatalogue,
        call: &ToolCall,
    ) -> Result<ToolExecution, ToolError> {
        let Some(tool) = catalogue.find(&call.name) else {
            warn!(requested_tool = %call.name, "Unknown tool requested by agent");
            return Ok(ToolExecution::rejected(
                &call.name,
                call.arguments.clone(),
                format!(
                    "{} is not a valid tool, try one of [{}].",
                    call.name,
                    catalogue.tool_names().join(", ")
                ),
            ));
        };

        let arguments = match &call.arguments {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => call.arguments.clone(),
            other => {
                warn!(tool = %tool.name, "Tool arguments are not a JSON object");
                return Ok(ToolExecution::rejected(
                    &tool.name,
                    other.clone(),
                    format!("arguments for {} must be a JSON object", tool.name),
                ));
            }
        };

        debug!(tool = %tool.name, server = %tool.server, "Dispatching tool via MCP");
        match self
            .bridge
            .invoke_tool(&tool.server, &tool.name, arguments.clone())
            .await
        {
            Ok(result) => {
                let is_error = result
                    .get("isError")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let execution = ToolExecution {
                    tool: tool.name.clone(),
                    success: !is_error,
                    input: arguments,
                    message: extract_tool_message(&result),
                    output: result,
                };
                info!(tool = %execution.tool, success = execution.success, "Tool executed");
                Ok(execution)
            }
            Err(source) => {
                warn!(tool = %tool.name, server = %tool.server, %source, "Tool execution failed");
                Err(ToolError::Execution {
                    tool: tool.name.clone(),
                    source,
                })
            }
        }
    }
}

/// Text content of an MCP tool result.
pub fn extract_tool_message(result: &Value) -> Option<String> {
    if let Some(array) = result.get("content").and_then(Value::as_array) {
        let texts: Vec<&str> = array
            .iter()
            .filter(|block| {
                block
                    .get("type")
                    .and_then(Value::as_str)
                    .map(|value| value.eq_ignore_ascii_case("text"))
                    .unwrap_or(false)
            })
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return Some(texts.join("\n"));
        }
    }

    result
        .get("structuredContent")
        .and_then(|structured| structured.get("error"))
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
