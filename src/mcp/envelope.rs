use crate::errors::ToolError;
use serde_json::Value;

/// MCP tool result carrying `payload` as a single JSON text block.
pub fn success_envelope(payload: &Value) -> Value {
    serde_json::json!({
        "content": [ { "type": "text", "text": render(payload) } ]
    })
}

/// Failed tool calls are still successful JSON-RPC responses; the failure
/// travels as the serialized error record with `isError` set.
pub fn error_envelope(error: &ToolError) -> Value {
    serde_json::json!({
        "content": [ { "type": "text", "text": render(&error.to_value()) } ],
        "isError": true,
    })
}

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
