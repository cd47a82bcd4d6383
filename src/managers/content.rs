use crate::constants::headers::TENANT_ID;
use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::ToolError;
use crate::services::api_client::{str_field, ApiClient};
use crate::services::logger::Logger;
use crate::services::request::{BuiltRequest, HttpMethod};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::text::non_empty;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const CONTENT_TOOLS: &[&str] = &["fetchUrlContent"];

/// Downloads arbitrary http(s) URLs, typically the parsed-text links that
/// document listings hand out.
#[derive(Clone)]
pub struct ContentManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl ContentManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("content"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, args: &Value) -> Result<BuiltRequest, ToolError> {
        let raw = self
            .validation
            .ensure_string(args.get("url").unwrap_or(&Value::Null), "url", true)?;
        let url = Url::parse(&raw)
            .map_err(|err| ToolError::invalid_params(format!("Invalid url {}: {}", raw, err)))?;
        let protocol = format!("{}:", url.scheme());
        if !ALLOWED_HTTP.contains(&protocol.as_str()) {
            return Err(ToolError::invalid_params(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            ))
            .with_hint("Only http and https URLs can be fetched"));
        }

        // Caller-chosen host: only explicitly passed credentials are attached.
        let mut headers = Vec::new();
        if let Some(api_key) = non_empty(str_field(args, "apiKey")) {
            headers.push(("Authorization".to_string(), format!("Bearer {}", api_key)));
        }
        if let Some(tenant) = non_empty(str_field(args, "tenantId")) {
            headers.push((TENANT_ID.to_string(), tenant.to_string()));
        }
        Ok(BuiltRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers,
            body: None,
        })
    }

    async fn fetch_url_content(&self, args: &Value) -> Result<Value, ToolError> {
        let request = self.request_for(args)?;
        let content = self
            .client
            .transport()
            .send_text(&request, self.client.timeout_ms())
            .await?;
        self.logger.debug(
            "fetched",
            Some(&serde_json::json!({ "url": request.url, "bytes": content.len() })),
        );
        Ok(serde_json::json!({ "content": content }))
    }
}

#[async_trait]
impl ToolHandler for ContentManager {
    fn tools(&self) -> &'static [&'static str] {
        CONTENT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "fetchUrlContent" => self.fetch_url_content(&args).await,
            _ => Err(unrouted_tool_error("content", tool)),
        }
    }
}
