//! Server configuration loaded from environment variables.
//!
//! Every setting has a default so the server starts with zero configuration
//! for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP API.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8000`
    pub http_addr: SocketAddr,

    /// Prefix of the locators handed out by the local media host.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:8000`
    pub public_base_url: String,

    /// Directory holding hosted media, served under `/media`.
    /// Env: `MEDIA_ROOT`
    /// Default: `./media`
    pub media_root: PathBuf,

    /// Directory where multipart uploads are spooled.
    /// Env: `UPLOAD_STAGING_DIR`
    /// Default: `./tmp/uploads`
    pub upload_staging_dir: PathBuf,

    /// Request body limit in bytes.
    /// Env: `MAX_UPLOAD_BYTES`
    /// Default: 512 MiB
    pub max_upload_bytes: usize,

    /// Default bearer token lifetime in seconds.
    /// Env: `TOKEN_TTL_SECS`
    /// Default: `3600`
    pub token_ttl_secs: i64,

    /// Fill the store with generated channels, videos and interactions.
    /// Env: `SEED_DEMO_DATA` (true/false)
    /// Default: `false`
    pub seed_demo_data: bool,

    /// PEM certificate chain; HTTPS is served only when both TLS paths are set.
    /// Env: `TLS_CERT_PATH`
    pub tls_cert_path: Option<PathBuf>,

    /// PEM private key.
    /// Env: `TLS_KEY_PATH`
    pub tls_key_path: Option<PathBuf>,

    /// Allow cross-origin requests from anywhere.
    /// Env: `CORS_ALLOW_ANY` (true/false)
    /// Default: `true`
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8000).into(),
            public_base_url: "http://localhost:8000".to_string(),
            media_root: PathBuf::from("./media"),
            upload_staging_dir: PathBuf::from("./tmp/uploads"),
            max_upload_bytes: 512 * 1024 * 1024, // 512 MiB
            token_ttl_secs: 3600,
            seed_demo_data: false,
            tls_cert_path: None,
            tls_key_path: None,
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(url) = lookup("PUBLIC_BASE_URL") {
            config.public_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(path) = lookup("MEDIA_ROOT") {
            config.media_root = PathBuf::from(path);
        }

        if let Some(path) = lookup("UPLOAD_STAGING_DIR") {
            config.upload_staging_dir = PathBuf::from(path);
        }

        if let Some(val) = lookup("MAX_UPLOAD_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_UPLOAD_BYTES, using default"),
            }
        }

        if let Some(val) = lookup("TOKEN_TTL_SECS") {
            match val.parse::<i64>() {
                Ok(n) if n > 0 => config.token_ttl_secs = n,
                _ => tracing::warn!(value = %val, "Invalid TOKEN_TTL_SECS, using default"),
            }
        }

        if let Some(val) = lookup("SEED_DEMO_DATA") {
            config.seed_demo_data = flag(&val);
        }

        config.tls_cert_path = lookup("TLS_CERT_PATH").filter(|p| !p.is_empty()).map(PathBuf::from);
        config.tls_key_path = lookup("TLS_KEY_PATH").filter(|p| !p.is_empty()).map(PathBuf::from);
        if config.tls_cert_path.is_some() != config.tls_key_path.is_some() {
            tracing::warn!("Only one of TLS_CERT_PATH and TLS_KEY_PATH is set, serving plain HTTP");
        }

        if let Some(val) = lookup("CORS_ALLOW_ANY") {
            config.cors_allow_any = flag(&val);
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }

    /// Certificate and key paths, when HTTPS is configured
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

fn flag(value: &str) -> bool {
    !matches!(value.trim(), "false" | "0" | "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8000).into());
        assert_eq!(config.max_upload_bytes, 512 * 1024 * 1024);
        assert!(config.tls_paths().is_none());
        assert!(config.cors_allow_any);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("PUBLIC_BASE_URL", "https://videos.example.org/"),
            ("TOKEN_TTL_SECS", "60"),
            ("SEED_DEMO_DATA", "true"),
            ("CORS_ALLOW_ANY", "0"),
            ("TLS_CERT_PATH", "/etc/tls/cert.pem"),
            ("TLS_KEY_PATH", "/etc/tls/key.pem"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.public_base_url, "https://videos.example.org");
        assert_eq!(config.token_ttl_secs, 60);
        assert!(config.seed_demo_data);
        assert!(!config.cors_allow_any);
        assert!(config.tls_paths().is_some());
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "not-an-address"),
            ("MAX_UPLOAD_BYTES", "-5"),
            ("TOKEN_TTL_SECS", "0"),
            ("TLS_CERT_PATH", "/etc/tls/cert.pem"),
        ]);
        let defaults = ServerConfig::default();
        assert_eq!(config.http_addr, defaults.http_addr);
        assert_eq!(config.max_upload_bytes, defaults.max_upload_bytes);
        assert_eq!(config.token_ttl_secs, defaults.token_ttl_secs);
        assert!(config.tls_paths().is_none());
    }
}
