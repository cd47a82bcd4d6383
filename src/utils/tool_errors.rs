use crate::constants::limits::SUGGESTIONS;
use crate::errors::{McpError, ToolError};
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[String]) -> McpError {
    let suggestions = suggest(tool, known_tools, SUGGESTIONS);
    let mut lines = vec![format!("Unknown tool: {}", tool)];
    if !suggestions.is_empty() {
        lines.push(format!("Did you mean: {}?", suggestions.join(", ")));
    }
    let mut sorted = known_tools.to_vec();
    sorted.sort();
    lines.push(format!("Available tools: {}.", sorted.join(", ")));
    McpError::invalid_params(lines.join("\n"))
}

/// A manager was handed a tool it does not declare. Only reachable through
/// a wiring mistake, so it reports as internal.
pub fn unrouted_tool_error(manager: &str, tool: &str) -> ToolError {
    ToolError::internal(format!("Tool {} is not served by the {} manager", tool, manager))
}
