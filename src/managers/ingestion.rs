use crate::constants::ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::errors::ToolError;
use crate::services::api_client::ApiClient;
use crate::services::logger::Logger;
use crate::services::request::{path_segment, HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::text::to_lower_kebab_case;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

const INGEST_TOOLS: &[&str] = &[
    "ingestText",
    "ingestUrls",
    "ingestSitemap",
    "ingestWebsite",
    "ingestConnector",
    "getIngestJobRunStatus",
];

/// Sources that ingest from an authorized third-party connection.
pub const CONNECTOR_SOURCES: &[&str] = &[
    "NOTION",
    "GOOGLE_DRIVE",
    "DROPBOX",
    "ONEDRIVE",
    "BOX",
    "SHAREPOINT",
];

#[derive(Clone)]
pub struct IngestionManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl IngestionManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("ingestion"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, tool: &str, args: &Value) -> Result<RequestSpec, ToolError> {
        let scope = self.client.scope(args)?;
        let namespace_id = self.client.namespace_id(args)?;
        let spec = match tool {
            "ingestText" => {
                self.ingest(args, &namespace_id, "TEXT", "/v1/ingest/text", scope.api_key)?
            }
            "ingestUrls" => {
                self.ingest(args, &namespace_id, "URLS_LIST", "/v1/ingest/urls", scope.api_key)?
            }
            "ingestSitemap" => {
                self.ingest(args, &namespace_id, "SITEMAP", "/v1/ingest/sitemap", scope.api_key)?
            }
            "ingestWebsite" => {
                self.ingest(args, &namespace_id, "WEBSITE", "/v1/ingest/website", scope.api_key)?
            }
            "ingestConnector" => {
                let config = self.ingest_config(args)?;
                let source = self.validation.ensure_string(
                    config.get("source").unwrap_or(&Value::Null),
                    "ingestConfig.source",
                    true,
                )?;
                if !CONNECTOR_SOURCES.contains(&source.as_str()) {
                    return Err(ToolError::invalid_params(format!(
                        "Unsupported connector source: {}",
                        source
                    ))
                    .with_hint(format!("Expected one of: {}", CONNECTOR_SOURCES.join(", "))));
                }
                let path = format!("/v1/ingest/{}", to_lower_kebab_case(&source));
                RequestSpec::new(HttpMethod::Post, path, scope.api_key)
                    .with_body(ingest_body(&namespace_id, config.clone()))
            }
            "getIngestJobRunStatus" => {
                let run_id = self.validation.ensure_string(
                    args.get("ingestJobRunId").unwrap_or(&Value::Null),
                    "ingestJobRunId",
                    true,
                )?;
                RequestSpec::new(
                    HttpMethod::Get,
                    format!("/v1/ingest-job-runs/{}", path_segment(&run_id)),
                    scope.api_key,
                )
                .with_query("namespaceId", Some(namespace_id))
            }
            _ => return Err(unrouted_tool_error("ingestion", tool)),
        };
        Ok(spec.with_tenant(scope.tenant_id))
    }

    fn ingest(
        &self,
        args: &Value,
        namespace_id: &str,
        source: &str,
        path: &str,
        api_key: String,
    ) -> Result<RequestSpec, ToolError> {
        let mut config = self.ingest_config(args)?.clone();
        match config.get("source").and_then(|v| v.as_str()) {
            Some(given) if given != source => {
                return Err(ToolError::invalid_params(format!(
                    "ingestConfig.source must be {} for this tool, got {}",
                    source, given
                )));
            }
            Some(_) => {}
            None => {
                config.insert("source".to_string(), Value::String(source.to_string()));
            }
        }
        Ok(RequestSpec::new(HttpMethod::Post, path, api_key)
            .with_body(ingest_body(namespace_id, config)))
    }

    fn ingest_config<'a>(&self, args: &'a Value) -> Result<&'a Map<String, Value>, ToolError> {
        self.validation
            .ensure_object(args.get("ingestConfig"), "ingestConfig")
    }
}

/// `{namespaceId, ingestConfig}` with the default chunking filled in when the
/// caller left it out.
pub fn ingest_body(namespace_id: &str, mut config: Map<String, Value>) -> Value {
    let has_chunk_config = config.get("chunkConfig").map_or(false, |v| !v.is_null());
    if !has_chunk_config {
        config.insert(
            "chunkConfig".to_string(),
            serde_json::json!({
                "chunkSize": DEFAULT_CHUNK_SIZE,
                "chunkOverlap": DEFAULT_CHUNK_OVERLAP,
            }),
        );
    }
    serde_json::json!({
        "namespaceId": namespace_id,
        "ingestConfig": Value::Object(config),
    })
}

#[async_trait]
impl ToolHandler for IngestionManager {
    fn tools(&self) -> &'static [&'static str] {
        INGEST_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self.request_for(tool, &args)?;
        self.logger.debug(tool, Some(&serde_json::json!({ "path": spec.path })));
        self.client.call(spec).await
    }
}
