pub mod api_client;
pub mod logger;
pub mod request;
pub mod resolver;
pub mod settings;
pub mod tool_executor;
pub mod transport;
pub mod validation;
