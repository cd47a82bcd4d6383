use crate::errors::ToolError;
use crate::services::api_client::{pick_fields, ApiClient};
use crate::services::logger::Logger;
use crate::services::request::{path_segment, HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const NAMESPACE_TOOLS: &[&str] = &[
    "createNamespace",
    "listNamespaces",
    "getNamespace",
    "updateNamespace",
    "deleteNamespace",
];

const CREATE_FIELDS: &[&str] = &[
    "name",
    "fileStorageConfig",
    "vectorStorageConfig",
    "embeddingModelConfig",
    "webScraperConfig",
];

const UPDATE_FIELDS: &[&str] = &[
    "fileStorageConfig",
    "vectorStorageConfig",
    "embeddingModelConfig",
    "webScraperConfig",
    "notionConfig",
    "googleDriveConfig",
    "dropboxConfig",
    "onedriveConfig",
    "boxConfig",
    "sharepointConfig",
];

#[derive(Clone)]
pub struct NamespaceManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl NamespaceManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("namespaces"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, tool: &str, args: &Value) -> Result<RequestSpec, ToolError> {
        let scope = self.client.scope(args)?;
        let spec = match tool {
            "createNamespace" => {
                self.validation.ensure_string(
                    args.get("name").unwrap_or(&Value::Null),
                    "name",
                    false,
                )?;
                RequestSpec::new(HttpMethod::Post, "/v1/namespaces", scope.api_key)
                    .with_body(Value::Object(pick_fields(args, CREATE_FIELDS)))
            }
            "listNamespaces" => RequestSpec::new(HttpMethod::Get, "/v1/namespaces", scope.api_key),
            "getNamespace" => {
                RequestSpec::new(HttpMethod::Get, self.namespace_path(args)?, scope.api_key)
            }
            "updateNamespace" => {
                let path = self.namespace_path(args)?;
                RequestSpec::new(HttpMethod::Patch, path, scope.api_key)
                    .with_body(Value::Object(pick_fields(args, UPDATE_FIELDS)))
            }
            "deleteNamespace" => {
                RequestSpec::new(HttpMethod::Delete, self.namespace_path(args)?, scope.api_key)
            }
            _ => return Err(unrouted_tool_error("namespaces", tool)),
        };
        Ok(spec.with_tenant(scope.tenant_id))
    }

    fn namespace_path(&self, args: &Value) -> Result<String, ToolError> {
        let namespace_id = self.client.namespace_id(args)?;
        Ok(format!("/v1/namespaces/{}", path_segment(&namespace_id)))
    }
}

#[async_trait]
impl ToolHandler for NamespaceManager {
    fn tools(&self) -> &'static [&'static str] {
        NAMESPACE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self.request_for(tool, &args)?;
        if spec.method == HttpMethod::Delete {
            self.logger.info("deleting namespace", Some(&serde_json::json!({ "path": spec.path })));
        }
        self.client.call(spec).await
    }
}
