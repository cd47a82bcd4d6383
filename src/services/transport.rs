use crate::constants::network::USER_AGENT;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::request::BuiltRequest;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::error::Error;
use std::time::{Duration, Instant};

/// Single-shot HTTP execution. No retries: two calls are two requests.
#[derive(Clone)]
pub struct Transport {
    logger: Logger,
    client: Client,
}

impl Transport {
    pub fn new(logger: Logger) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("transport"),
            client,
        })
    }

    /// Sends `request` and returns the parsed JSON body of a 2xx response.
    pub async fn send(&self, request: &BuiltRequest, timeout_ms: u64) -> Result<Value, ToolError> {
        let (status, text) = self.execute(request, timeout_ms).await?;
        if !status.is_success() {
            let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            let err = ToolError::api(status.as_u16(), payload);
            self.logger.error(
                &format!("SourceSync API Error: {}", err.message),
                Some(&serde_json::json!({
                    "method": request.method.as_str(),
                    "url": request.url,
                    "status": status.as_u16(),
                    "error": err.error,
                })),
            );
            return Err(err);
        }
        serde_json::from_str::<Value>(&text).map_err(|parse_err| {
            self.logger.error(
                "SourceSync API returned a malformed success body",
                Some(&serde_json::json!({
                    "url": request.url,
                    "status": status.as_u16(),
                    "parse_error": parse_err.to_string(),
                })),
            );
            ToolError::api(status.as_u16(), Value::String(text))
                .with_details(serde_json::json!({ "parse_error": parse_err.to_string() }))
        })
    }

    /// Like [`Transport::send`] but returns the body as text, for endpoints
    /// that serve documents rather than JSON.
    pub async fn send_text(
        &self,
        request: &BuiltRequest,
        timeout_ms: u64,
    ) -> Result<String, ToolError> {
        let (status, text) = self.execute(request, timeout_ms).await?;
        if !status.is_success() {
            let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(ToolError::api(status.as_u16(), payload));
        }
        Ok(text)
    }

    /// Races the whole exchange (headers and body) against the deadline.
    /// Whichever finishes first wins; the other future is dropped, which
    /// aborts the connection or cancels the timer.
    async fn execute(
        &self,
        request: &BuiltRequest,
        timeout_ms: u64,
    ) -> Result<(StatusCode, String), ToolError> {
        let mut req = self
            .client
            .request(request.method.to_reqwest(), request.url.as_str())
            .headers(to_header_map(&request.headers)?);
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let started = Instant::now();
        self.logger.debug(
            "request",
            Some(&serde_json::json!({
                "method": request.method.as_str(),
                "url": request.url,
            })),
        );
        let exchange = async {
            let response = req.send().await.map_err(map_reqwest_error)?;
            let status = response.status();
            let text = response.text().await.map_err(map_reqwest_error)?;
            Ok::<_, ToolError>((status, text))
        };
        let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), exchange).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Err(_) => {
                self.logger.warn(
                    "request timed out",
                    Some(&serde_json::json!({
                        "method": request.method.as_str(),
                        "url": request.url,
                        "timeout_ms": timeout_ms,
                    })),
                );
                Err(ToolError::timeout(timeout_ms))
            }
            Ok(Err(err)) => {
                self.logger.warn(
                    "request failed",
                    Some(&serde_json::json!({
                        "url": request.url,
                        "duration_ms": elapsed_ms,
                        "cause": err.message,
                    })),
                );
                Err(err)
            }
            Ok(Ok((status, text))) => {
                self.logger.debug(
                    "response",
                    Some(&serde_json::json!({
                        "url": request.url,
                        "status": status.as_u16(),
                        "duration_ms": elapsed_ms,
                        "bytes": text.len(),
                    })),
                );
                Ok((status, text))
            }
        }
    }
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap, ToolError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ToolError::invalid_params(format!("Invalid header name: {}", key)))?;
        let val = HeaderValue::from_str(value)
            .map_err(|_| ToolError::invalid_params(format!("Invalid value for header {}", key)))?;
        map.insert(name, val);
    }
    Ok(map)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    let mut cause = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        cause = format!("{}: {}", cause, inner);
        source = inner.source();
    }
    ToolError::request_failed(cause)
}

#[cfg(test)]
mod tests {
    use super::to_header_map;

    #[test]
    fn header_map_rejects_control_characters() {
        let headers = vec![("X-Tenant-ID".to_string(), "bad\nvalue".to_string())];
        let err = to_header_map(&headers).expect_err("newline must be rejected");
        assert!(err.message.contains("X-Tenant-ID"));
    }

    #[test]
    fn header_map_keeps_all_entries() {
        let headers = vec![
            ("Authorization".to_string(), "Bearer k".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["accept"], "application/json");
    }
}
