use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel boundary regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("separator regex"));

pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// `GOOGLE_DRIVE` -> `google-drive`, `OneDrive` -> `one-drive`.
pub fn to_lower_kebab_case(value: &str) -> String {
    let split = CAMEL_BOUNDARY.replace_all(value.trim(), "$1-$2");
    SEPARATORS.replace_all(&split, "-").to_lowercase()
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{non_empty, to_lower_kebab_case, truncate_utf8_prefix};

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
        assert_eq!(truncate_utf8_prefix("aé", 2), "a");
    }

    #[test]
    fn kebab_case_handles_connector_sources() {
        assert_eq!(to_lower_kebab_case("GOOGLE_DRIVE"), "google-drive");
        assert_eq!(to_lower_kebab_case("NOTION"), "notion");
        assert_eq!(to_lower_kebab_case("HelloWorld"), "hello-world");
        assert_eq!(to_lower_kebab_case("share point"), "share-point");
    }

    #[test]
    fn blank_strings_are_not_values() {
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some("ns_1")), Some("ns_1"));
        assert_eq!(non_empty(None), None);
    }
}
