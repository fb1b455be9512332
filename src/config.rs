use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default)]
    pub search_url: String,
    #[serde(default)]
    pub intake_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub mock_mode: bool,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            search_url: String::new(),
            intake_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            mock_mode: false,
        }
    }
}

fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySettings {
    /// Comma-separated list of allowed CORS origins; unset allows any origin
    pub allowed_origins: Option<String>,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            allowed_origins: None,
            body_limit_bytes: default_body_limit(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
        }
    }
}

impl SecuritySettings {
    /// Parsed origin allow-list; empty means any origin
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_body_limit() -> usize { 200 * 1024 }
fn default_rate_limit_max() -> u32 { 20 }
fn default_rate_limit_window() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_label")]
    pub label: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self { label: default_site_label() }
    }
}

fn default_site_label() -> String { "PatsPeak".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with INTAKE_)
    /// 4. Deployment variables (PORT, TARGET_API_URL, MOCK_MODE, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., INTAKE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("INTAKE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_deployment_env(settings, |key| std::env::var(key).ok())?;

        settings.try_deserialize()
    }
}

/// Plain deployment variables and the settings keys they override
const DEPLOYMENT_VARS: &[(&str, &str)] = &[
    ("TARGET_API_SEARCH_URL", "upstream.search_url"),
    ("TARGET_API_URL", "upstream.intake_url"),
    ("TARGET_API_KEY", "upstream.api_key"),
    ("CORS_ORIGIN", "security.allowed_origins"),
    ("SITE_LABEL", "site.label"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

/// Override config values with the plain variables a deployment sets
///
/// `PORT` and `MOCK_MODE` are typed; `MOCK_MODE` is on only for a
/// case-insensitive "true".
fn apply_deployment_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in DEPLOYMENT_VARS {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    if let Some(port) = lookup("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid PORT {:?}: {}", port, e)))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }

    if let Some(mock) = lookup("MOCK_MODE") {
        builder = builder.set_override("upstream.mock_mode", mock.trim().eq_ignore_ascii_case("true"))?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_env(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let base = Config::builder().build().unwrap();
        apply_deployment_env(base, |key| vars.get(key).cloned())
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_env(&[]);
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.upstream.timeout_secs, 10);
        assert!(!settings.upstream.mock_mode);
        assert_eq!(settings.security.body_limit_bytes, 200 * 1024);
        assert_eq!(settings.security.rate_limit_max, 20);
        assert_eq!(settings.security.rate_limit_window_secs, 60);
        assert_eq!(settings.site.label, "PatsPeak");
        assert!(settings.security.origins().is_empty());
    }

    #[test]
    fn test_deployment_overrides() {
        let settings = from_env(&[
            ("PORT", "8080"),
            ("TARGET_API_SEARCH_URL", "https://registry.test/search"),
            ("TARGET_API_URL", "https://registry.test/intake"),
            ("TARGET_API_KEY", "k"),
            ("MOCK_MODE", "TRUE"),
            ("CORS_ORIGIN", "https://a.test, https://b.test"),
            ("SITE_LABEL", "Demo"),
        ]);

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.upstream.search_url, "https://registry.test/search");
        assert_eq!(settings.upstream.intake_url, "https://registry.test/intake");
        assert!(settings.upstream.mock_mode);
        assert_eq!(settings.security.origins(), vec!["https://a.test", "https://b.test"]);
        assert_eq!(settings.site.label, "Demo");
    }

    #[test]
    fn test_mock_mode_requires_literal_true() {
        assert!(!from_env(&[("MOCK_MODE", "1")]).upstream.mock_mode);
        assert!(!from_env(&[("MOCK_MODE", "yes")]).upstream.mock_mode);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }
}
