use crate::constants::env;
use crate::errors::ToolError;
use crate::services::settings::Settings;
use crate::utils::text::non_empty;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    ApiKey,
    NamespaceId,
    OrganizationId,
}

impl ConfigKind {
    pub fn param_name(self) -> &'static str {
        match self {
            ConfigKind::ApiKey => "apiKey",
            ConfigKind::NamespaceId => "namespaceId",
            ConfigKind::OrganizationId => "organizationId",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKind::ApiKey => env::API_KEY,
            ConfigKind::NamespaceId => env::NAMESPACE_ID,
            ConfigKind::OrganizationId => env::ORGANIZATION_ID,
        }
    }
}

/// Explicit call parameters win; blank strings count as absent and fall
/// through to the start-up snapshot.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    settings: Arc<Settings>,
}

impl ConfigResolver {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolve(&self, explicit: Option<&str>, kind: ConfigKind) -> Result<String, ToolError> {
        self.resolve_optional(explicit, kind)
            .ok_or_else(|| ToolError::missing_config(kind.param_name(), kind.env_var()))
    }

    pub fn resolve_optional(&self, explicit: Option<&str>, kind: ConfigKind) -> Option<String> {
        if let Some(value) = non_empty(explicit) {
            return Some(value.to_string());
        }
        non_empty(self.default_for(kind)).map(|v| v.to_string())
    }

    /// Tenant scoping is optional: no tenant is a valid outcome.
    pub fn resolve_tenant(&self, explicit: Option<&str>) -> Option<String> {
        non_empty(explicit)
            .or_else(|| non_empty(self.settings.tenant_id.as_deref()))
            .map(|v| v.to_string())
    }

    fn default_for(&self, kind: ConfigKind) -> Option<&str> {
        match kind {
            ConfigKind::ApiKey => self.settings.api_key.as_deref(),
            ConfigKind::NamespaceId => self.settings.namespace_id.as_deref(),
            ConfigKind::OrganizationId => self.settings.organization_id.as_deref(),
        }
    }
}
