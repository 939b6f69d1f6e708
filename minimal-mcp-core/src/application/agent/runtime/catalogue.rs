use super::ToolRuntime;
use crate::application::agent::context::{ServerGuidance, ToolCatalogue, ToolDescriptor};
use crate::application::agent::errors::ToolError;
use tracing::{debug, warn};

impl ToolRuntime {
    /// Start every server and collect its guidance and tools.
    ///
    /// A tool name claimed by an earlier server shadows later ones.
    pub async fn discover(&self) -> Result<ToolCatalogue, ToolError> {
        let mut catalogue = ToolCatalogue::default();

        for server in &self.servers {
            let tools = self
                .bridge
                .list_tools(server)
                .await
                .map_err(|source| ToolError::Discovery {
                    server: server.clone(),
                    source,
                })?;

            if let Some(instruction) = self.bridge.server_instructions(server).await {
                if !instruction.trim().is_empty() {
                    catalogue.servers.push(ServerGuidance {
                        name: server.clone(),
                        instruction: instruction.trim().to_string(),
                    });
                }
            }

            debug!(server = %server, tool_count = tools.len(), "Discovered MCP tools");
            for info in tools {
                if let Some(existing) = catalogue.tools.iter().find(|t| t.name == info.name) {
                    warn!(
                        tool = %info.name,
                        server = %server,
                        kept_from = %existing.server,
                        "Duplicate tool name, keeping the first registration"
                    );
                    continue;
                }
                catalogue.tools.push(ToolDescriptor {
                    name: info.name,
                    description: info.description.filter(|d| !d.trim().is_empty()),
                    server: server.clone(),
                    input_schema: info.input_schema,
                });
            }
        }

        Ok(catalogue)
    }
}
