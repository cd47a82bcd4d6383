use crate::errors::ToolError;
use crate::services::api_client::{pick_fields, str_field, ApiClient};
use crate::services::logger::Logger;
use crate::services::request::{path_segment, HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unrouted_tool_error;
use crate::utils::text::non_empty;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const CONNECTION_TOOLS: &[&str] = &[
    "createConnection",
    "listConnections",
    "getConnection",
    "updateConnection",
    "revokeConnection",
];

#[derive(Clone)]
pub struct ConnectionManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl ConnectionManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("connections"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, tool: &str, args: &Value) -> Result<RequestSpec, ToolError> {
        let scope = self.client.scope(args)?;
        let namespace_id = self.client.namespace_id(args)?;
        let spec = match tool {
            "createConnection" => {
                for field in ["name", "connector"] {
                    self.validation
                        .ensure_string(args.get(field).unwrap_or(&Value::Null), field, false)?;
                }
                let mut body = serde_json::Map::new();
                body.insert("namespaceId".to_string(), Value::String(namespace_id));
                body.extend(pick_fields(args, &["name", "connector", "clientRedirectUrl"]));
                RequestSpec::new(HttpMethod::Post, "/v1/connections", scope.api_key)
                    .with_body(Value::Object(body))
            }
            "listConnections" => {
                let connector = non_empty(str_field(args, "connector"));
                RequestSpec::new(HttpMethod::Get, "/v1/connections", scope.api_key)
                    .with_query("namespaceId", Some(namespace_id))
                    .with_query("connector", connector)
            }
            "getConnection" => {
                RequestSpec::new(HttpMethod::Get, self.connection_path(args, "")?, scope.api_key)
                    .with_query("namespaceId", Some(namespace_id))
            }
            "updateConnection" => {
                let mut body = serde_json::Map::new();
                body.insert("namespaceId".to_string(), Value::String(namespace_id));
                body.extend(pick_fields(args, &["name", "clientRedirectUrl"]));
                RequestSpec::new(HttpMethod::Patch, self.connection_path(args, "")?, scope.api_key)
                    .with_body(Value::Object(body))
            }
            "revokeConnection" => RequestSpec::new(
                HttpMethod::Post,
                self.connection_path(args, "/revoke")?,
                scope.api_key,
            )
            .with_body(json!({ "namespaceId": namespace_id })),
            _ => return Err(unrouted_tool_error("connections", tool)),
        };
        Ok(spec.with_tenant(scope.tenant_id))
    }

    fn connection_path(&self, args: &Value, suffix: &str) -> Result<String, ToolError> {
        let connection_id = self.validation.ensure_string(
            args.get("connectionId").unwrap_or(&Value::Null),
            "connectionId",
            true,
        )?;
        Ok(format!(
            "/v1/connections/{}{}",
            path_segment(&connection_id),
            suffix
        ))
    }
}

#[async_trait]
impl ToolHandler for ConnectionManager {
    fn tools(&self) -> &'static [&'static str] {
        CONNECTION_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self.request_for(tool, &args)?;
        if tool == "revokeConnection" {
            self.logger.info("revoking connection", Some(&json!({ "path": spec.path })));
        }
        self.client.call(spec).await
    }
}
