//! Profile management
//!
//! Profiles are named, persisted connection settings for a splunkd
//! instance, including credentials or a session token.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigManager, ContextConfig};
use crate::error::{Error, Result};

/// A named set of connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    #[serde(flatten)]
    pub connection: ContextConfig,
}

impl Profile {
    pub fn new(name: impl Into<String>, connection: ContextConfig) -> Self {
        Self {
            name: name.into(),
            connection,
        }
    }

    /// `scheme://host:port` for display
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}",
            self.connection.scheme, self.connection.host, self.connection.port
        )
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// The profile named in `defaults.profile`, if any
    pub fn default_profile(&self) -> Result<Option<Profile>> {
        let config = self.config_manager.load()?;
        let Some(name) = config.defaults.profile else {
            return Ok(None);
        };
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .map(Some)
            .ok_or(Error::ProfileNotFound(name))
    }

    /// Add or update a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut config = self.config_manager.load()?;

        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Make `name` the profile used when none is given
    pub fn set_default(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        if !config.profiles.iter().any(|p| p.name == name) {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        config.defaults.profile = Some(name.to_string());
        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        if config.defaults.profile.as_deref() == Some(name) {
            config.defaults.profile = None;
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let profile_manager = ProfileManager::with_config_manager(config_manager);
        (profile_manager, temp_dir)
    }

    fn profile(name: &str, host: &str) -> Profile {
        Profile::new(
            name,
            ContextConfig {
                host: host.to_string(),
                ..ContextConfig::with_credentials("admin", "changeme")
            },
        )
    }

    #[test]
    fn test_profile_endpoint() {
        let p = profile("local", "localhost");
        assert_eq!(p.endpoint(), "https://localhost:8089");
    }

    #[test]
    fn test_profile_toml_is_flat() {
        let text = toml::to_string(&profile("local", "localhost")).unwrap();
        assert!(text.contains("name = \"local\""));
        assert!(text.contains("host = \"localhost\""));
        assert!(!text.contains("[connection]"));

        let back: Profile = toml::from_str(&text).unwrap();
        assert_eq!(back, profile("local", "localhost"));
    }

    #[test]
    fn test_profile_manager_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("prod", "splunk.example.com")).unwrap();

        let retrieved = manager.get("prod").unwrap();
        assert_eq!(retrieved.name, "prod");
        assert_eq!(retrieved.connection.host, "splunk.example.com");
    }

    #[test]
    fn test_profile_manager_list() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("a", "a.example.com")).unwrap();
        manager.set(profile("b", "b.example.com")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 2);
    }

    #[test]
    fn test_profile_manager_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("test", "localhost")).unwrap();
        manager.set_default("test").unwrap();
        assert!(manager.exists("test").unwrap());

        manager.remove("test").unwrap();
        assert!(!manager.exists("test").unwrap());
        assert!(manager.default_profile().unwrap().is_none());
    }

    #[test]
    fn test_profile_manager_remove_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.remove("nonexistent");
        assert!(matches!(result.unwrap_err(), Error::ProfileNotFound(_)));
    }

    #[test]
    fn test_profile_manager_get_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.get("nonexistent");
        assert!(matches!(result.unwrap_err(), Error::ProfileNotFound(_)));
    }

    #[test]
    fn test_default_profile() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert!(manager.default_profile().unwrap().is_none());

        manager.set(profile("prod", "splunk.example.com")).unwrap();
        assert!(matches!(
            manager.set_default("missing"),
            Err(Error::ProfileNotFound(_))
        ));

        manager.set_default("prod").unwrap();
        let default = manager.default_profile().unwrap().unwrap();
        assert_eq!(default.name, "prod");
    }

    #[test]
    fn test_profile_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(profile("test", "old.example.com")).unwrap();
        manager.set(profile("test", "new.example.com")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].connection.host, "new.example.com");
    }
}
