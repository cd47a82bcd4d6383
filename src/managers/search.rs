use crate::errors::ToolError;
use crate::services::api_client::{pick_fields, ApiClient};
use crate::services::logger::Logger;
use crate::services::request::{HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const SEARCH_TOOLS: &[&str] = &["semanticSearch", "hybridSearch"];

const SEMANTIC_FIELDS: &[&str] = &["query", "topK", "scoreThreshold", "filter", "searchType"];
const HYBRID_FIELDS: &[&str] = &[
    "query",
    "topK",
    "scoreThreshold",
    "filter",
    "hybridConfig",
    "searchType",
];

#[derive(Clone)]
pub struct SearchManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl SearchManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("search"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, tool: &str, args: &Value) -> Result<RequestSpec, ToolError> {
        let (path, fields, default_type) = match tool {
            "semanticSearch" => ("/v1/search", SEMANTIC_FIELDS, "SEMANTIC"),
            "hybridSearch" => ("/v1/search/hybrid", HYBRID_FIELDS, "HYBRID"),
            _ => return Err(unrouted_tool_error("search", tool)),
        };
        self.validation
            .ensure_string(args.get("query").unwrap_or(&Value::Null), "query", false)?;
        if tool == "hybridSearch" {
            self.validation
                .ensure_object(args.get("hybridConfig"), "hybridConfig")?;
        }
        let scope = self.client.scope(args)?;
        let namespace_id = self.client.namespace_id(args)?;

        let mut body = pick_fields(args, fields);
        body.insert("namespaceId".to_string(), Value::String(namespace_id));
        body.entry("searchType")
            .or_insert_with(|| Value::String(default_type.to_string()));
        Ok(RequestSpec::new(HttpMethod::Post, path, scope.api_key)
            .with_body(Value::Object(body))
            .with_tenant(scope.tenant_id))
    }
}

#[async_trait]
impl ToolHandler for SearchManager {
    fn tools(&self) -> &'static [&'static str] {
        SEARCH_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self.request_for(tool, &args)?;
        self.logger.debug(tool, spec.body.as_ref().and_then(|b| b.get("searchType")));
        self.client.call(spec).await
    }
}
