pub mod network {
    pub const DEFAULT_API_URL: &str = "https://api.sourcesync.ai";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const USER_AGENT: &str = concat!("sourcesync-mcp/", env!("CARGO_PKG_VERSION"));
}

pub mod env {
    pub const API_URL: &str = "SOURCESYNC_API_URL";
    pub const API_TIMEOUT_MS: &str = "SOURCESYNC_API_TIMEOUT_MS";
    pub const API_KEY: &str = "SOURCESYNC_API_KEY";
    pub const NAMESPACE_ID: &str = "SOURCESYNC_NAMESPACE_ID";
    pub const ORGANIZATION_ID: &str = "SOURCESYNC_ORGANIZATION_ID";
    pub const TENANT_ID: &str = "SOURCESYNC_TENANT_ID";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod headers {
    pub const TENANT_ID: &str = "X-Tenant-ID";
    pub const JSON: &str = "application/json";
}

pub mod ingest {
    pub const DEFAULT_CHUNK_SIZE: u64 = 400;
    pub const DEFAULT_CHUNK_OVERLAP: u64 = 50;
}

pub mod limits {
    pub const LOG_PAYLOAD_BYTES: usize = 2_048;
    pub const SUGGESTIONS: usize = 3;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
