use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Tag carried by every failure that crosses the tool boundary. Callers switch
/// on this, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// An identifier was required but neither supplied nor configured.
    MissingConfig,
    /// The remote call exceeded the configured timeout.
    Timeout,
    /// No HTTP response was obtained (DNS, refused connection, broken body).
    RequestFailed,
    /// The remote service answered, but not with a usable success body.
    Api,
    InvalidParams,
    Internal,
}

impl ToolErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ToolErrorKind::MissingConfig => "MISSING_CONFIG",
            ToolErrorKind::Timeout => "TIMEOUT",
            ToolErrorKind::RequestFailed => "REQUEST_FAILED",
            ToolErrorKind::Api => "API_ERROR",
            ToolErrorKind::InvalidParams => "INVALID_PARAMS",
            ToolErrorKind::Internal => "INTERNAL",
        }
    }
}

/// The error record relayed to MCP callers. `message` is human readable;
/// `status` and `error` hold what the remote side actually sent.
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            message: message.into(),
            status: None,
            error: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn missing_config(parameter: &str, env_var: &str) -> Self {
        Self::new(
            ToolErrorKind::MissingConfig,
            format!("{} is required but was not provided", parameter),
        )
        .with_hint(format!(
            "Pass {} explicitly or set {} in the server environment.",
            parameter, env_var
        ))
        .with_details(serde_json::json!({ "parameter": parameter, "env": env_var }))
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        let mut err = Self::new(
            ToolErrorKind::Timeout,
            format!("Request timed out after {}ms", timeout_ms),
        );
        err.details = Some(serde_json::json!({ "timeout_ms": timeout_ms }));
        err
    }

    pub fn request_failed(cause: impl Into<String>) -> Self {
        let cause = cause.into();
        Self::new(
            ToolErrorKind::RequestFailed,
            format!("Request failed: {}", cause),
        )
        .with_details(serde_json::json!({ "cause": cause }))
    }

    /// Remote failure. `payload` is the parsed JSON body when the body parsed,
    /// otherwise the raw response text.
    pub fn api(status: u16, payload: Value) -> Self {
        let mut err = Self::new(ToolErrorKind::Api, api_status_label(status));
        err.status = Some(status);
        err.error = Some(payload);
        err
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "kind": self.kind, "message": self.message })
        })
    }
}

pub fn api_status_label(status: u16) -> String {
    match status {
        400 => "Validation Error".to_string(),
        401 => "Authentication Error".to_string(),
        403 => "Forbidden Error".to_string(),
        404 => "Not Found Error".to_string(),
        405 => "Method Not Allowed Error".to_string(),
        429 => "Too Many Requests Error".to_string(),
        200..=299 => "Malformed Response Error".to_string(),
        500..=599 => "Server Error".to_string(),
        other => format!("Request Error ({})", other),
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_message_and_payload_apart() {
        let err = ToolError::api(404, serde_json::json!({"message": "namespace not found"}));
        let value = err.to_value();
        assert_eq!(value["kind"], "api");
        assert_eq!(value["message"], "Not Found Error");
        assert_eq!(value["status"], 404);
        assert_eq!(value["error"]["message"], "namespace not found");
    }

    #[test]
    fn optional_fields_are_omitted_when_empty() {
        let value = ToolError::invalid_params("bad").to_value();
        let obj = value.as_object().expect("object");
        assert!(!obj.contains_key("status"));
        assert!(!obj.contains_key("error"));
        assert_eq!(obj["code"], "INVALID_PARAMS");
    }

    #[test]
    fn timeout_carries_configured_duration() {
        let err = ToolError::timeout(1500);
        assert_eq!(err.kind, ToolErrorKind::Timeout);
        assert_eq!(err.details.as_ref().unwrap()["timeout_ms"], 1500);
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn unlisted_statuses_get_a_generic_label() {
        assert_eq!(api_status_label(409), "Request Error (409)");
        assert_eq!(api_status_label(503), "Server Error");
    }
}
