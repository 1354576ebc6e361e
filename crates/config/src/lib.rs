use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "hearthside.toml",
    "config/hearthside.toml",
    "crates/config/hearthside.toml",
    "../hearthside.toml",
    "../config/hearthside.toml",
    "../crates/config/hearthside.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub notifications: NotificationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Options for calls made against the external credential provider.
///
/// ```
/// use hearthside_config::ProviderConfig;
///
/// let provider = ProviderConfig::default();
/// assert_eq!(provider.request_timeout_seconds, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "ProviderConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ProviderConfig {
    const fn default_request_timeout() -> u64 {
        10
    }

    /// Bounded timeout applied to every credential-provider call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How often hosts should re-pull pending counts from the stores.
    #[serde(default = "NotificationConfig::default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl NotificationConfig {
    const fn default_refresh_interval() -> u64 {
        60
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: Self::default_refresh_interval(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use hearthside_config::load;
///
/// std::env::remove_var("HEARTHSIDE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(config.provider.request_timeout_seconds > 0);
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default(
            "provider.request_timeout_seconds",
            i64::try_from(defaults.provider.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "notifications.refresh_interval_seconds",
            i64::try_from(defaults.notifications.refresh_interval_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("HEARTHSIDE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HEARTHSIDE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HEARTHSIDE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded accounts backend configuration");
    Ok(config)
}
