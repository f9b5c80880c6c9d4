use std::fs;
use std::path::Path;

use crate::proxy::PortalConfig;
use super::paths::get_data_dir;

const CONFIG_FILE: &str = "portal_config.json";

/// Load portal configuration from the data directory
pub fn load_portal_config() -> Result<PortalConfig, String> {
    let data_dir = get_data_dir()?;
    load_portal_config_from(&data_dir.join(CONFIG_FILE))
}

/// Save portal configuration to the data directory
pub fn save_portal_config(config: &PortalConfig) -> Result<(), String> {
    let data_dir = get_data_dir()?;
    save_portal_config_to(&data_dir.join(CONFIG_FILE), config)
}

/// Load configuration from `path`, writing defaults there when it is missing
pub fn load_portal_config_from(path: &Path) -> Result<PortalConfig, String> {
    if !path.exists() {
        let config = PortalConfig::default();
        let _ = save_portal_config_to(path, &config);
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse config file: {}", e))
}

pub fn save_portal_config_to(path: &Path, config: &PortalConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(path, content)
        .map_err(|e| format!("Failed to save config: {}", e))
}

/// Resolved listen address after overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindTarget {
    pub host: String,
    pub port: u16,
}

fn is_enabled(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Apply `USECASE_PORTAL_*` overrides on top of the file configuration.
///
/// `lookup` is `std::env::var` in the binary; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut PortalConfig, lookup: F) -> BindTarget
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("USECASE_PORTAL_ALLOW_LAN") {
        if is_enabled(&value) {
            config.allow_lan_access = true;
        }
    }

    if let Some(value) = lookup("USECASE_PORTAL_PORT") {
        match value.trim().parse::<u16>() {
            Ok(port) => config.port = port,
            Err(e) => tracing::warn!("Invalid USECASE_PORTAL_PORT value {}: {}", value, e),
        }
    }

    if let Some(token) = lookup("USECASE_PORTAL_TOKEN") {
        if token.is_empty() {
            tracing::warn!("USECASE_PORTAL_TOKEN is empty, keeping configured secret");
        } else {
            config.auth.shared_secret = token;
        }
    }

    if let Some(url) = lookup("USECASE_PORTAL_UPSTREAM_URL") {
        if !url.trim().is_empty() {
            config.upstream.base_url = url.trim().to_string();
        }
    }

    if let Some(value) = lookup("USECASE_PORTAL_ENV") {
        match value.parse() {
            Ok(env) => config.environment = env,
            Err(e) => tracing::warn!("Ignoring USECASE_PORTAL_ENV: {}", e),
        }
    }

    if let Some(value) = lookup("USECASE_PORTAL_MAX_PAGE_SIZE") {
        match value.trim().parse::<u32>() {
            Ok(0) => config.upstream.max_page_size = None,
            Ok(limit) => config.upstream.max_page_size = Some(limit),
            Err(e) => tracing::warn!("Invalid USECASE_PORTAL_MAX_PAGE_SIZE value {}: {}", value, e),
        }
    }

    let host = if let Some(addr) = lookup("USECASE_PORTAL_BIND") {
        if addr != "127.0.0.1" && addr != "localhost" {
            config.allow_lan_access = true;
        }
        addr
    } else {
        config.get_bind_address().to_string()
    };

    BindTarget {
        host,
        port: config.port,
    }
}
