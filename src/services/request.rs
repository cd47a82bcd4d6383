use crate::constants::headers::{JSON, TENANT_ID};
use crate::errors::ToolError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use url::Url;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One outgoing call, fully resolved. Query values of `None` are dropped at
/// build time rather than sent as empty parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    pub tenant_id: Option<String>,
    pub query: Vec<(String, Option<String>)>,
    pub credential: String,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            tenant_id: None,
            query: Vec::new(),
            credential: credential.into(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_tenant(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_query<V: Into<String>>(mut self, key: &str, value: Option<V>) -> Self {
        self.query.push((key.to_string(), value.map(Into::into)));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl BuiltRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build(&self, spec: &RequestSpec) -> Result<BuiltRequest, ToolError> {
        let raw = format!("{}{}", self.base_url, spec.path);
        let mut url = Url::parse(&raw)
            .map_err(|_| ToolError::invalid_params(format!("Invalid request URL: {}", raw)))?;
        let defined: Vec<(&str, &str)> = spec
            .query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
            .collect();
        if !defined.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in defined {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", spec.credential),
            ),
            ("Accept".to_string(), JSON.to_string()),
        ];
        let body = match &spec.body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), JSON.to_string()));
                Some(serde_json::to_string(body).map_err(|err| {
                    ToolError::internal(format!("Failed to serialize request body: {}", err))
                })?)
            }
            None => None,
        };
        if let Some(tenant) = &spec.tenant_id {
            headers.push((TENANT_ID.to_string(), tenant.clone()));
        }

        Ok(BuiltRequest {
            method: spec.method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}

/// Percent-encodes a caller-supplied id for use as a single path segment.
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}
