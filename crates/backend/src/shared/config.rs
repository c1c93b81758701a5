use contracts::domain::a002_llm_config::sanitizer::PlaceholderPolicy;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub voice_platform: VoicePlatformConfig,
    pub account_service: AccountServiceConfig,
    #[serde(default)]
    pub calls: CallsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Каталог со сборкой dashboard; при пустой строке не раздаётся
    #[serde(default)]
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VoicePlatformConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccountServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CallsConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl CallsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub placeholder_policy: PlaceholderPolicy,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    3
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[voice_platform]
base_url = "https://api.retellai.com"
timeout_secs = 30

[account_service]
base_url = "http://localhost:4000"
timeout_secs = 15

[calls]
poll_interval_secs = 3

[tools]
placeholder_policy = "reject"
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `VOICE_PLATFORM_BASE_URL` и `ACCOUNT_SERVICE_BASE_URL` переопределяют адреса.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match config_path_next_to_exe() {
        Some(config_path) if config_path.exists() => {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&contents)?
        }
        Some(config_path) => {
            tracing::warn!("config.toml not found at: {}", config_path.display());
            tracing::info!("Using default embedded configuration");
            toml::from_str::<Config>(DEFAULT_CONFIG)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            toml::from_str::<Config>(DEFAULT_CONFIG)?
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn config_path_next_to_exe() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    Some(exe_path.parent()?.join("config.toml"))
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("VOICE_PLATFORM_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.voice_platform.base_url = url;
    }
    if let Some(url) = var("ACCOUNT_SERVICE_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.account_service.base_url = url;
    }
}

/// Зафиксировать конфигурацию процесса (вызывается один раз из main)
pub fn init(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized, keeping the first one");
    }
}

/// Текущая конфигурация; до `init` используется встроенная
pub fn get() -> &'static Config {
    CONFIG.get_or_init(default_config)
}

fn default_config() -> Config {
    Config {
        server: ServerConfig {
            host: "0.0.0.0".into(),
            port: 3000,
            static_dir: String::new(),
        },
        voice_platform: VoicePlatformConfig {
            base_url: "https://api.retellai.com".into(),
            timeout_secs: default_timeout_secs(),
        },
        account_service: AccountServiceConfig {
            base_url: "http://localhost:4000".into(),
            timeout_secs: default_timeout_secs(),
        },
        calls: CallsConfig::default(),
        tools: ToolsConfig::default(),
    }
}

/// Каталог статики dashboard (относительный путь считается от исполняемого файла)
pub fn get_static_dir(config: &Config) -> Option<PathBuf> {
    let dir = config.server.static_dir.trim();
    if dir.is_empty() {
        return None;
    }
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return Some(path);
    }
    match std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.join(&path))) {
        Some(resolved) => Some(resolved),
        None => Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.calls.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.tools.placeholder_policy, PlaceholderPolicy::Reject);

        let fallback = default_config();
        assert_eq!(fallback.voice_platform.base_url, config.voice_platform.base_url);
        assert_eq!(fallback.account_service.base_url, config.account_service.base_url);
        assert_eq!(fallback.calls.poll_interval_secs, config.calls.poll_interval_secs);
    }

    #[test]
    fn test_optional_sections_default() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [voice_platform]
            base_url = "https://platform.test"

            [account_service]
            base_url = "https://accounts.test"
            "#,
        )
        .unwrap();
        assert_eq!(config.voice_platform.timeout_secs, 30);
        assert_eq!(config.calls.poll_interval_secs, 3);
        assert!(get_static_dir(&config).is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        apply_env_overrides(&mut config, |key| match key {
            "VOICE_PLATFORM_BASE_URL" => Some("https://staging.platform.test".into()),
            "ACCOUNT_SERVICE_BASE_URL" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.voice_platform.base_url, "https://staging.platform.test");
        assert_eq!(config.account_service.base_url, "http://localhost:4000");
    }
}
