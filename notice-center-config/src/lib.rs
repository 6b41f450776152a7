use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr, sync::Arc};
use tokio::sync::watch;

/// Numeric limits the notice manager reads from its settings provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Setting {
    /// Maximum number of persistent notices alive at once.
    MaxPersistentAllow,
    /// Maximum number of non-persistent notices retained before eviction.
    NotificationsPool,
}

impl Setting {
    /// External name of the option in a settings store.
    pub fn name(&self) -> &'static str {
        match self {
            Setting::MaxPersistentAllow => "maxPersistentAllow",
            Setting::NotificationsPool => "notificationsPool",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Setting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maxPersistentAllow" => Ok(Setting::MaxPersistentAllow),
            "notificationsPool" => Ok(Setting::NotificationsPool),
            other => Err(ConfigError::UnknownSetting(other.to_string())),
        }
    }
}

/// Source of the numeric limits.
///
/// Values are read on every relevant operation, so implementations backed by
/// live state make runtime reconfiguration take effect immediately.
pub trait SettingsProvider: Send + Sync {
    fn get_value(&self, setting: Setting) -> u32;
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for Arc<T> {
    fn get_value(&self, setting: Setting) -> u32 {
        (**self).get_value(setting)
    }
}

impl SettingsProvider for watch::Receiver<NoticesConfig> {
    fn get_value(&self, setting: Setting) -> u32 {
        self.borrow().get_value(setting)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticesConfig {
    /// The maximum number of persistent notices that may exist at once.
    #[serde(default = "default_max_persistent_allow")]
    pub max_persistent_allow: u32,
    /// The maximum number of non-persistent notices kept before the oldest is evicted.
    #[serde(default = "default_notifications_pool")]
    pub notifications_pool: u32,
    /// Time in milliseconds a closing notice stays in state so it can animate out.
    #[serde(default = "default_delete_delay_ms")]
    pub delete_delay_ms: u64,
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            max_persistent_allow: default_max_persistent_allow(),
            notifications_pool: default_notifications_pool(),
            delete_delay_ms: default_delete_delay_ms(),
        }
    }
}

impl SettingsProvider for NoticesConfig {
    fn get_value(&self, setting: Setting) -> u32 {
        match setting {
            Setting::MaxPersistentAllow => self.max_persistent_allow,
            Setting::NotificationsPool => self.notifications_pool,
        }
    }
}

impl NoticesConfig {
    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!("Loaded notice config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Both limits must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_persistent_allow == 0 {
            return Err(ConfigError::Invalid(Setting::MaxPersistentAllow));
        }
        if self.notifications_pool == 0 {
            return Err(ConfigError::Invalid(Setting::NotificationsPool));
        }
        Ok(())
    }

    pub fn delete_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.delete_delay_ms)
    }
}

// Default value helpers for serde
const fn default_max_persistent_allow() -> u32 {
    3
}

const fn default_notifications_pool() -> u32 {
    5
}

const fn default_delete_delay_ms() -> u64 {
    1000
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    Io(String),
    /// Config file is not valid JSON for this schema
    Parse(String),
    /// A limit that must be positive is zero
    Invalid(Setting),
    /// Setting name not recognized
    UnknownSetting(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(setting) => write!(f, "Setting '{}' must be at least 1", setting),
            ConfigError::UnknownSetting(name) => write!(f, "Unknown setting '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = NoticesConfig::default();

        assert_eq!(config.max_persistent_allow, 3);
        assert_eq!(config.notifications_pool, 5);
        assert_eq!(config.delete_delay_ms, 1000);
        assert_eq!(config.delete_delay(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_config_serialization() {
        let config = NoticesConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("max_persistent_allow"));
        assert!(json.contains("notifications_pool"));
        assert!(json.contains("delete_delay_ms"));
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        // Older files may only carry the pool size
        let partial = r#"{ "notifications_pool": 8 }"#;

        let config = NoticesConfig::from_json_str(partial).unwrap();

        assert_eq!(config.notifications_pool, 8);
        assert_eq!(config.max_persistent_allow, 3);
        assert_eq!(config.delete_delay_ms, 1000);
    }

    #[test]
    fn test_config_deserialization_full() {
        let full = r#"{
            "max_persistent_allow": 1,
            "notifications_pool": 2,
            "delete_delay_ms": 250
        }"#;

        let config = NoticesConfig::from_json_str(full).unwrap();

        assert_eq!(config.max_persistent_allow, 1);
        assert_eq!(config.notifications_pool, 2);
        assert_eq!(config.delete_delay_ms, 250);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = NoticesConfig::from_json_str(r#"{ "notifications_pool": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::Invalid(Setting::NotificationsPool));

        let err = NoticesConfig::from_json_str(r#"{ "max_persistent_allow": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::Invalid(Setting::MaxPersistentAllow));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = NoticesConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_persistent_allow": 2, "notifications_pool": 4 }}"#).unwrap();

        let config = NoticesConfig::load(file.path()).unwrap();
        assert_eq!(config.get_value(Setting::MaxPersistentAllow), 2);
        assert_eq!(config.get_value(Setting::NotificationsPool), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = NoticesConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_setting_names_round_trip() {
        for setting in [Setting::MaxPersistentAllow, Setting::NotificationsPool] {
            assert_eq!(setting.name().parse::<Setting>().unwrap(), setting);
        }
        assert!(matches!(
            "poolSize".parse::<Setting>(),
            Err(ConfigError::UnknownSetting(_))
        ));
    }

    #[test]
    fn test_watch_provider_sees_updates() {
        let (tx, rx) = watch::channel(NoticesConfig::default());
        assert_eq!(rx.get_value(Setting::NotificationsPool), 5);

        tx.send_modify(|c| c.notifications_pool = 9);
        assert_eq!(rx.get_value(Setting::NotificationsPool), 9);

        let shared: Arc<dyn SettingsProvider> = Arc::new(rx);
        assert_eq!(shared.get_value(Setting::NotificationsPool), 9);
    }
}
