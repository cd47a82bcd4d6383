use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::constants::limits::SUGGESTIONS;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::redact::redact_value;
use crate::utils::suggest::suggest;

use serde_json::Value;

/// One manager serves a family of tools; `tool` tells it which one.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tools(&self) -> &'static [&'static str];

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, managers: Vec<Arc<dyn ToolHandler>>) -> Self {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for manager in managers {
            for tool in manager.tools() {
                handlers.insert((*tool).to_string(), manager.clone());
            }
        }
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            let suggestions = suggest(tool, &self.tool_names(), SUGGESTIONS);
            let hint = if suggestions.is_empty() {
                "Call tools/list to see available tools".to_string()
            } else {
                format!("Did you mean: {}", suggestions.join(", "))
            };
            return Err(
                ToolError::invalid_params(format!("Unknown tool: {}", tool)).with_hint(hint)
            );
        };

        let call_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.debug(
            tool,
            Some(&serde_json::json!({
                "call_id": call_id,
                "args": redact_value(&args),
            })),
        );

        let result = handler.handle(tool, args).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => self.logger.info(
                tool,
                Some(&serde_json::json!({
                    "call_id": call_id,
                    "duration_ms": duration_ms,
                    "ok": true,
                })),
            ),
            Err(err) => self.logger.warn(
                tool,
                Some(&serde_json::json!({
                    "call_id": call_id,
                    "duration_ms": duration_ms,
                    "ok": false,
                    "code": err.code,
                })),
            ),
        }
        result
    }
}
