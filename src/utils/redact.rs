use crate::utils::text::truncate_utf8_prefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const REDACTION: &str = "[REDACTED]";

const SENSITIVE_KEYS: &[&str] = &[
    "apikey",
    "api_key",
    "authorization",
    "password",
    "accesskey",
    "accesskeyid",
    "secretkey",
    "secretaccesskey",
    "clientsecret",
];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+[A-Za-z0-9._~+/=-]+").expect("bearer redaction regex"),
            "$1 [REDACTED]",
        ),
        (
            Regex::new(r#"("(?:apiKey|api_key|secretKey|clientSecret)"\s*:\s*)"[^"]*""#)
                .expect("json key redaction regex"),
            "$1\"[REDACTED]\"",
        ),
    ]
});

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase().replace('-', "_");
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_KEYS.contains(&normalized.as_str())
        || normalized.contains("secret")
        || normalized.contains("token")
}

/// Copies `value`, replacing credentials anywhere in the tree.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    out.insert(key.clone(), Value::String(REDACTION.to_string()));
                } else {
                    out.insert(key.clone(), redact_value(val));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(text) => Value::String(redact_text(text, usize::MAX)),
        other => other.clone(),
    }
}

pub fn redact_text(text: &str, max_bytes: usize) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    if out.len() > max_bytes {
        let mut truncated = truncate_utf8_prefix(&out, max_bytes);
        truncated.push_str("...");
        return truncated;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{redact_text, redact_value};
    use serde_json::json;

    #[test]
    fn redact_value_hides_nested_credentials() {
        let input = json!({
            "apiKey": "sk_live_123",
            "vectorStorageConfig": {"provider": "PINECONE", "apiKey": "pc-key"},
            "fileStorageConfig": {"credentials": {"secretAccessKey": "s3"}},
            "name": "docs"
        });
        let out = redact_value(&input);
        assert_eq!(out["apiKey"], "[REDACTED]");
        assert_eq!(out["vectorStorageConfig"]["apiKey"], "[REDACTED]");
        assert_eq!(out["vectorStorageConfig"]["provider"], "PINECONE");
        assert_eq!(
            out["fileStorageConfig"]["credentials"]["secretAccessKey"],
            "[REDACTED]"
        );
        assert_eq!(out["name"], "docs");
    }

    #[test]
    fn redact_text_hides_bearer_tokens() {
        let out = redact_text("Authorization: Bearer abc.def-123", usize::MAX);
        assert_eq!(out, "Authorization: Bearer [REDACTED]");
    }

    #[test]
    fn redact_text_truncates_long_payloads() {
        let out = redact_text(&"x".repeat(50), 10);
        assert_eq!(out, format!("{}...", "x".repeat(10)));
    }
}
