use super::ToolRuntime;
use crate::application::agent::context::ToolCatalogue;

impl ToolRuntime {
    pub fn compose_system_instructions(&self, catalogue: &ToolCatalogue) -> String {
        let mut lines = vec![
            "You are a helpful assistant that can call tools provided by MCP servers.".to_string(),
            "Use the tools whenever they help to fulfil the request; call as many as needed."
                .to_string(),
            "Base your answer on the tool results and reply to the user in plain text once every part of the request is handled."
                .to_string(),
        ];

        if catalogue.is_empty() {
            lines.push("No tools are currently available.".to_string());
            return lines.join("\n");
        }

        for guidance in &catalogue.servers {
            lines.push(format!(
                "Server '{}' guidance: {}",
                guidance.name, guidance.instruction
            ));
        }

        if !catalogue.tools.is_empty() {
            lines.push("Available tools:".to_string());
            for descriptor in &catalogue.tools {
                let mut line = format!("- {} (server: {})", descriptor.name, descriptor.server);
                if let Some(description) = &descriptor.description {
                    line.push_str(&format!(": {}", description));
                }
                lines.push(line);
            }
        }

        lines.join("\n")
    }
}
