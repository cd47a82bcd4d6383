mod mcp_error;
mod tool_error;

pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{api_status_label, ToolError, ToolErrorKind};
