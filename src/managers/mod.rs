pub mod auth;
pub mod connections;
pub mod content;
pub mod documents;
pub mod ingestion;
pub mod namespaces;
pub mod search;

#[cfg(test)]
pub(crate) fn test_client(
    settings: crate::services::settings::Settings,
) -> std::sync::Arc<crate::services::api_client::ApiClient> {
    use crate::services::logger::{LogLevel, Logger};
    std::sync::Arc::new(
        crate::services::api_client::ApiClient::new(
            Logger::with_level("test", LogLevel::Error),
            std::sync::Arc::new(settings),
        )
        .expect("api client"),
    )
}
