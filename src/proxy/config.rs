use serde::{Deserialize, Serialize};

pub const DEFAULT_SHARED_SECRET: &str = "1234567890";
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://data-analytics-llm.onrender.com";

/// Deployment environment, decides whether the session cookie is `Secure`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

/// Portal service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to allow LAN access
    /// - false: loopback only 127.0.0.1 (default)
    /// - true: all interfaces 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Directory holding the prebuilt front-end, served for non-API paths
    #[serde(default = "default_web_root")]
    pub web_root: String,
}

/// Credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The single token every login and data request must present
    #[serde(default = "default_shared_secret")]
    pub shared_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: default_shared_secret(),
        }
    }
}

/// Upstream use case API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL, `/use-cases` is appended
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Outbound request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Upper bound for forwarded `page_size`. Unset forwards both
    /// parameters verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_page_size: Option<u32>,

    /// Outbound proxy
    #[serde(default)]
    pub proxy: UpstreamProxyConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            request_timeout: default_request_timeout(),
            max_page_size: None,
            proxy: UpstreamProxyConfig::default(),
        }
    }
}

/// Outbound proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allow_lan_access: false,
            environment: Environment::default(),
            auth: AuthConfig::default(),
            upstream: UpstreamConfig::default(),
            web_root: default_web_root(),
        }
    }
}

fn default_port() -> u16 {
    8045
}

fn default_shared_secret() -> String {
    DEFAULT_SHARED_SECRET.to_string()
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_web_root() -> String {
    "web".to_string()
}

impl PortalConfig {
    /// Get the actual listen address
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}
