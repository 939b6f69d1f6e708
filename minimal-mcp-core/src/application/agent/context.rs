use crate::types::ToolSpec;
use serde::Serialize;
use serde_json::{Value, json};

/// Tools and server guidance discovered at the start of a run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ToolCatalogue {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerGuidance>,
}

impl ToolCatalogue {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.servers.is_empty()
    }

    /// Exact name match first, then case-insensitive.
    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools
            .iter()
            .find(|tool| tool.name == name)
            .or_else(|| {
                self.tools
                    .iter()
                    .find(|tool| tool.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name.as_str()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(ToolDescriptor::to_spec).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolDescriptor {
    pub fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self
                .input_schema
                .clone()
                .unwrap_or_else(|| json!({ "type": "object", "properties": {} })),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerGuidance {
    pub name: String,
    pub instruction: String,
}
