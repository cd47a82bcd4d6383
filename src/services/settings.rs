use crate::constants::{env, network, protocols::ALLOWED_HTTP};
use crate::errors::ToolError;
use url::Url;

/// Process-wide configuration, read from the environment exactly once at
/// start-up and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL without a trailing slash; request paths start with `/`.
    pub api_url: String,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
    pub namespace_id: Option<String>,
    pub organization_id: Option<String>,
    pub tenant_id: Option<String>,
}

impl Settings {
    pub fn new(api_url: &str) -> Result<Self, ToolError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            timeout_ms: network::TIMEOUT_API_REQUEST_MS,
            api_key: None,
            namespace_id: None,
            organization_id: None,
            tenant_id: None,
        })
    }

    pub fn from_env() -> Result<Self, ToolError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let api_url = read(env::API_URL).unwrap_or_else(|| network::DEFAULT_API_URL.to_string());
        let timeout_ms = match read(env::API_TIMEOUT_MS) {
            Some(raw) => parse_timeout(&raw)?,
            None => network::TIMEOUT_API_REQUEST_MS,
        };
        Ok(Self {
            api_url: normalize_api_url(&api_url)?,
            timeout_ms,
            api_key: read(env::API_KEY),
            namespace_id: read(env::NAMESPACE_ID),
            organization_id: read(env::ORGANIZATION_ID),
            tenant_id: read(env::TENANT_ID),
        })
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_namespace_id(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = Some(namespace_id.into());
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Summary safe for logs: which defaults exist, never their values.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "api_url": self.api_url,
            "timeout_ms": self.timeout_ms,
            "api_key": self.api_key.is_some(),
            "namespace_id": self.namespace_id.is_some(),
            "organization_id": self.organization_id.is_some(),
            "tenant_id": self.tenant_id.is_some(),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ToolError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ToolError::invalid_params(format!(
            "{} must be a positive integer (milliseconds), got '{}'",
            env::API_TIMEOUT_MS, raw
        ))),
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ToolError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| {
        ToolError::invalid_params(format!("{} is not a valid URL: '{}'", env::API_URL, raw))
    })?;
    let scheme = format!("{}:", parsed.scheme());
    if !ALLOWED_HTTP.contains(&scheme.as_str()) {
        return Err(ToolError::invalid_params(format!(
            "{} must use http or https",
            env::API_URL
        )));
    }
    Ok(trimmed.to_string())
}
