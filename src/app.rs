use crate::errors::ToolError;
use crate::managers::auth::AuthManager;
use crate::managers::connections::ConnectionManager;
use crate::managers::content::ContentManager;
use crate::managers::documents::DocumentManager;
use crate::managers::ingestion::IngestionManager;
use crate::managers::namespaces::NamespaceManager;
use crate::managers::search::SearchManager;
use crate::mcp::catalog::tool_catalog;
use crate::services::api_client::ApiClient;
use crate::services::logger::Logger;
use crate::services::settings::Settings;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub settings: Arc<Settings>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(executor: &ToolExecutor) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !executor.has_tool(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Reads the environment once and wires every manager to the result.
    pub fn initialize() -> Result<Self, ToolError> {
        Self::with_settings(Settings::from_env()?)
    }

    pub fn with_settings(settings: Settings) -> Result<Self, ToolError> {
        let logger = Logger::new("sourcesync");
        let validation = Validation::new();
        let settings = Arc::new(settings);
        let client = Arc::new(ApiClient::new(logger.clone(), settings.clone())?);

        let managers: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(AuthManager::new(logger.clone(), client.clone())),
            Arc::new(NamespaceManager::new(logger.clone(), validation.clone(), client.clone())),
            Arc::new(IngestionManager::new(logger.clone(), validation.clone(), client.clone())),
            Arc::new(DocumentManager::new(logger.clone(), validation.clone(), client.clone())),
            Arc::new(SearchManager::new(logger.clone(), validation.clone(), client.clone())),
            Arc::new(ConnectionManager::new(logger.clone(), validation.clone(), client.clone())),
            Arc::new(ContentManager::new(logger.clone(), validation, client)),
        ];
        let tool_executor = ToolExecutor::new(logger.clone(), managers);
        Self::validate_tool_wiring(&tool_executor)?;

        Ok(Self {
            logger,
            settings,
            tool_executor: Arc::new(tool_executor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_tool_has_a_handler_and_nothing_extra() {
        let app = App::with_settings(Settings::new("http://127.0.0.1:9").unwrap()).unwrap();
        let mut catalog: Vec<String> = tool_catalog().iter().map(|t| t.name.clone()).collect();
        catalog.sort();
        assert_eq!(app.tool_executor.tool_names(), catalog);
    }
}
