use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::request::{RequestBuilder, RequestSpec};
use crate::services::resolver::{ConfigKind, ConfigResolver};
use crate::services::settings::Settings;
use crate::services::transport::Transport;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Credential and tenant resolved for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallScope {
    pub api_key: String,
    pub tenant_id: Option<String>,
}

/// Resolve → build → send, once per call.
#[derive(Clone)]
pub struct ApiClient {
    logger: Logger,
    resolver: ConfigResolver,
    builder: RequestBuilder,
    transport: Transport,
    timeout_ms: u64,
}

impl ApiClient {
    pub fn new(logger: Logger, settings: Arc<Settings>) -> Result<Self, ToolError> {
        let logger = logger.child("api");
        let builder = RequestBuilder::new(settings.api_url.clone());
        let timeout_ms = settings.timeout_ms;
        Ok(Self {
            transport: Transport::new(logger.clone())?,
            resolver: ConfigResolver::new(settings),
            logger,
            builder,
            timeout_ms,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Resolves the credential and tenant named in `args`, falling back to
    /// the configured defaults.
    pub fn scope(&self, args: &Value) -> Result<CallScope, ToolError> {
        let api_key = self
            .resolver
            .resolve(str_field(args, "apiKey"), ConfigKind::ApiKey)?;
        let tenant_id = self.resolver.resolve_tenant(str_field(args, "tenantId"));
        Ok(CallScope { api_key, tenant_id })
    }

    pub fn namespace_id(&self, args: &Value) -> Result<String, ToolError> {
        self.resolver
            .resolve(str_field(args, "namespaceId"), ConfigKind::NamespaceId)
    }

    pub async fn call(&self, spec: RequestSpec) -> Result<Value, ToolError> {
        let built = self.builder.build(&spec)?;
        self.logger.debug(
            "call",
            Some(&serde_json::json!({
                "method": built.method.as_str(),
                "path": spec.path,
                "tenant": spec.tenant_id.is_some(),
            })),
        );
        self.transport.send(&built, self.timeout_ms).await
    }
}

pub fn str_field<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Keeps only `keys` that are present and non-null, in `keys` order.
pub fn pick_fields(args: &Value, keys: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for key in keys {
        if let Some(value) = args.get(*key).filter(|v| !v.is_null()) {
            out.insert((*key).to_string(), value.clone());
        }
    }
    out
}
