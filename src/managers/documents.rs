use crate::errors::ToolError;
use crate::services::api_client::ApiClient;
use crate::services::logger::Logger;
use crate::services::request::{HttpMethod, RequestSpec};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unrouted_tool_error;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Response fields lifted out of `data` for document listings, as
/// (remote name, returned name).
const PAGE_FIELDS: &[(&str, &str)] = &[
    ("documents", "data"),
    ("hasNextPage", "hasNextPage"),
    ("nextCursor", "nextCursor"),
    ("statsBySource", "statsBySource"),
    ("statsByStatus", "statsByStatus"),
];

const DOCUMENT_TOOLS: &[&str] = &[
    "fetchDocuments",
    "getDocuments",
    "updateDocuments",
    "deleteDocuments",
    "resyncDocuments",
];

#[derive(Clone)]
pub struct DocumentManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
}

impl DocumentManager {
    pub fn new(logger: Logger, validation: Validation, client: Arc<ApiClient>) -> Self {
        Self {
            logger: logger.child("documents"),
            validation,
            client,
        }
    }

    pub fn request_for(&self, tool: &str, args: &Value) -> Result<RequestSpec, ToolError> {
        let scope = self.client.scope(args)?;
        let namespace_id = self.client.namespace_id(args)?;
        let spec = match tool {
            "fetchDocuments" | "getDocuments" => {
                let filter = self.filter_config(args)?;
                let include = self
                    .validation
                    .ensure_optional_object(args.get("includeConfig"), "includeConfig")?
                    .cloned()
                    .map(Value::Object)
                    .unwrap_or_else(|| json!({ "documents": true }));
                let mut body = Map::new();
                body.insert("namespaceId".to_string(), Value::String(namespace_id));
                body.insert("filterConfig".to_string(), Value::Object(filter));
                body.insert("includeConfig".to_string(), include);
                if let Some(pagination) = self
                    .validation
                    .ensure_optional_object(args.get("pagination"), "pagination")?
                {
                    body.insert("pagination".to_string(), Value::Object(pagination.clone()));
                }
                RequestSpec::new(HttpMethod::Post, "/v1/documents", scope.api_key)
                    .with_body(Value::Object(body))
            }
            "updateDocuments" => {
                let (filter, data) = self.update_parts(args)?;
                RequestSpec::new(HttpMethod::Patch, "/v1/documents", scope.api_key).with_body(
                    json!({
                        "namespaceId": namespace_id,
                        "filterConfig": filter,
                        "data": data,
                    }),
                )
            }
            "deleteDocuments" => {
                let filter = scoped(tool, self.filter_config(args)?)?;
                RequestSpec::new(HttpMethod::Delete, "/v1/documents", scope.api_key).with_body(
                    json!({
                        "namespaceId": namespace_id,
                        "filterConfig": filter,
                    }),
                )
            }
            "resyncDocuments" => {
                let filter = scoped(tool, self.filter_config(args)?)?;
                RequestSpec::new(HttpMethod::Post, "/v1/documents/resync", scope.api_key).with_body(
                    json!({
                        "namespaceId": namespace_id,
                        "filterConfig": filter,
                    }),
                )
            }
            _ => return Err(unrouted_tool_error("documents", tool)),
        };
        Ok(spec.with_tenant(scope.tenant_id))
    }

    /// The caller's `filterConfig` (or an empty one) with the `documentIds`
    /// shorthand folded in, unless the filter already names ids.
    fn filter_config(&self, args: &Value) -> Result<Map<String, Value>, ToolError> {
        let mut filter = self
            .validation
            .ensure_optional_object(args.get("filterConfig"), "filterConfig")?
            .cloned()
            .unwrap_or_default();
        let ids = args
            .get("documentIds")
            .and_then(|v| v.as_array())
            .filter(|ids| !ids.is_empty());
        if let Some(ids) = ids {
            merge_document_ids(&mut filter, ids.clone());
        }
        Ok(filter)
    }

    fn update_parts(&self, args: &Value) -> Result<(Map<String, Value>, Value), ToolError> {
        let mut filter = self.filter_config(args)?;
        let data = self
            .validation
            .ensure_optional_object(args.get("data"), "data")?
            .cloned()
            .unwrap_or_default();

        let documents = args
            .get("documents")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let mut ids = Vec::with_capacity(documents.len());
        let mut merged_metadata = Map::new();
        for (idx, doc) in documents.iter().enumerate() {
            let id = self.validation.ensure_string(
                doc.get("documentId").unwrap_or(&Value::Null),
                &format!("documents[{}].documentId", idx),
                true,
            )?;
            ids.push(Value::String(id));
            if let Some(metadata) = doc.get("metadata").and_then(|v| v.as_object()) {
                for (key, value) in metadata {
                    merged_metadata.insert(key.clone(), value.clone());
                }
            }
        }
        if !ids.is_empty() {
            merge_document_ids(&mut filter, ids);
        }
        let filter = scoped("updateDocuments", filter)?;

        let metadata = if merged_metadata.is_empty() {
            data.get("metadata")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| json!({}))
        } else {
            Value::Object(merged_metadata)
        };
        let operations = data
            .get("$metadata")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({ "$set": {}, "$append": {}, "$remove": {} }));
        Ok((filter, json!({ "metadata": metadata, "$metadata": operations })))
    }
}

fn merge_document_ids(filter: &mut Map<String, Value>, ids: Vec<Value>) {
    if !filter.get("documentIds").map_or(false, narrows) {
        filter.insert("documentIds".to_string(), Value::Array(ids));
    }
}

fn narrows(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Mutating document calls must select something: an empty filter would hit
/// every document in the namespace.
fn scoped(tool: &str, filter: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
    if filter.values().any(narrows) {
        return Ok(filter);
    }
    Err(
        ToolError::invalid_params(format!("{} requires a non-empty filterConfig", tool))
            .with_hint("Pass documentIds or at least one filterConfig criterion"),
    )
}

/// Flattens a `{data: {documents, hasNextPage, ...}}` listing into
/// `{data: [...], hasNextPage, ...}`. Absent fields stay absent.
pub fn paginated_documents(response: Value) -> Result<Value, ToolError> {
    let Some(page) = response.get("data").and_then(|v| v.as_object()) else {
        return Err(
            ToolError::internal("SourceSync document listing has no data object")
                .with_details(response.clone()),
        );
    };
    let mut out = Map::new();
    for (remote, local) in PAGE_FIELDS {
        if let Some(value) = page.get(*remote) {
            out.insert((*local).to_string(), value.clone());
        }
    }
    Ok(Value::Object(out))
}

#[async_trait]
impl ToolHandler for DocumentManager {
    fn tools(&self) -> &'static [&'static str] {
        DOCUMENT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self.request_for(tool, &args)?;
        if spec.method == HttpMethod::Delete {
            self.logger.info("deleting documents", Some(&json!({ "tool": tool })));
        }
        let response = self.client.call(spec).await?;
        match tool {
            "fetchDocuments" | "getDocuments" => paginated_documents(response),
            _ => Ok(response),
        }
    }
}
