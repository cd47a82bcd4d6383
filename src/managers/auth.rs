use crate::errors::{ToolError, ToolErrorKind};
use crate::services::api_client::ApiClient;
use crate::services::logger::Logger;
use crate::services::request::{HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const AUTH_TOOLS: &[&str] = &["validateApiKey"];

/// Checks a credential by making the cheapest authenticated call there is.
#[derive(Clone)]
pub struct AuthManager {
    logger: Logger,
    client: Arc<ApiClient>,
}

impl AuthManager {
    pub fn new(logger: Logger, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("auth"),
            client,
        }
    }

    pub fn request_for(&self, args: &Value) -> Result<RequestSpec, ToolError> {
        let scope = self.client.scope(args)?;
        Ok(RequestSpec::new(HttpMethod::Get, "/v1/namespaces", scope.api_key)
            .with_tenant(scope.tenant_id))
    }

    async fn validate_api_key(&self, args: &Value) -> Result<Value, ToolError> {
        let spec = self.request_for(args)?;
        match self.client.call(spec).await {
            Ok(_) => Ok(serde_json::json!({ "valid": true })),
            Err(err) if is_rejection(&err) => {
                self.logger.info(
                    "credential rejected",
                    Some(&serde_json::json!({ "status": err.status })),
                );
                Ok(serde_json::json!({ "valid": false, "error": err.to_value() }))
            }
            Err(err) => Err(err),
        }
    }
}

/// 401 and 403 answer the question; anything else means we could not ask it.
fn is_rejection(err: &ToolError) -> bool {
    err.kind == ToolErrorKind::Api && matches!(err.status, Some(401) | Some(403))
}

#[async_trait]
impl ToolHandler for AuthManager {
    fn tools(&self) -> &'static [&'static str] {
        AUTH_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "validateApiKey" => self.validate_api_key(&args).await,
            _ => Err(unrouted_tool_error("auth", tool)),
        }
    }
}
