//! CLI configuration management.

use keymagic_licensing::{ClientConfig, ManagerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SECRET_MASK: &str = "********";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Store URL hosting the licensing endpoint.
    #[serde(default)]
    pub api_url: String,
    /// Product name as known to the store.
    #[serde(default)]
    pub item_name: String,
    /// Installed product version.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: String,
    /// Settings prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// URL the license is activated for.
    #[serde(default)]
    pub site_url: String,
    /// Settings file. Defaults to the platform data directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Secret for form nonces.
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_prefix() -> String {
    "keymagic".to_string()
}

fn default_secret() -> String {
    "keymagic-cli".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_verify_tls() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            item_name: String::new(),
            version: default_version(),
            author: String::new(),
            prefix: default_prefix(),
            site_url: String::new(),
            store_path: None,
            secret: default_secret(),
            timeout_secs: default_timeout(),
            verify_tls: default_verify_tls(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file, then apply `KEYMAGIC_*` overrides.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from file only. This is what `config set` edits,
    /// so environment overrides never end up on disk.
    pub fn load_file() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy safe to print: the nonce secret is masked.
    pub fn redacted(&self) -> Self {
        Self {
            secret: SECRET_MASK.to_string(),
            ..self.clone()
        }
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    fn project_dirs() -> Result<directories::ProjectDirs, Box<dyn std::error::Error>> {
        directories::ProjectDirs::from("io", "keymagic", "keymagic")
            .ok_or_else(|| "Could not determine config directory".into())
    }

    /// Settings file in use.
    pub fn store_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("settings.json")),
        }
    }

    /// Override fields from environment variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let keys = [
            "api_url",
            "item_name",
            "version",
            "author",
            "prefix",
            "site_url",
            "store_path",
            "secret",
            "timeout_secs",
            "verify_tls",
        ];
        for key in keys {
            let name = format!("KEYMAGIC_{}", key.to_uppercase());
            if let Some(value) = lookup(&name) {
                // Invalid values from the environment are ignored.
                let _ = self.set(key, &value);
            }
        }
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "item_name" => self.item_name = value.to_string(),
            "version" => self.version = value.to_string(),
            "author" => self.author = value.to_string(),
            "prefix" => self.prefix = value.to_string(),
            "site_url" => self.site_url = value.to_string(),
            "store_path" => self.store_path = Some(PathBuf::from(value)),
            "secret" => self.secret = value.to_string(),
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .map_err(|_| format!("Invalid timeout: {}", value))?;
            }
            "verify_tls" => {
                self.verify_tls = match value {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => return Err(format!("Invalid boolean: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            prefix: self.prefix.clone(),
            menu_slug: None,
            api_url: self.api_url.clone(),
            version: self.version.clone(),
            item_name: self.item_name.clone(),
            author: self.author.clone(),
            site_url: self.site_url.clone(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            verify_tls: self.verify_tls,
            ..ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_keys() {
        let mut config = CliConfig::default();
        config.set("api_url", "https://store.test").unwrap();
        config.set("timeout_secs", "30").unwrap();
        config.set("verify_tls", "no").unwrap();

        assert_eq!(config.api_url, "https://store.test");
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = CliConfig::default();
        assert!(config.set("timeout_secs", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config.apply_env(|name| match name {
            "KEYMAGIC_ITEM_NAME" => Some("Awesome Plugin".to_string()),
            "KEYMAGIC_TIMEOUT_SECS" => Some("not-a-number".to_string()),
            _ => None,
        });

        assert_eq!(config.item_name, "Awesome Plugin");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.manager_config().prefix, "keymagic");
    }

    #[test]
    fn test_yaml_defaults() {
        let config: CliConfig = serde_yaml::from_str("api_url: https://store.test\n").unwrap();
        assert_eq!(config.prefix, "keymagic");
        assert!(config.verify_tls);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_redacted_masks_secret() {
        let mut config = CliConfig::default();
        config.set("secret", "s3cr3t-value").unwrap();
        config.set("api_url", "https://store.test").unwrap();

        let shown = serde_yaml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("s3cr3t"));
        assert!(shown.contains("https://store.test"));
        assert_eq!(config.secret, "s3cr3t-value");
    }

    #[test]
    fn test_env_overrides_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keymagic").join("config.yaml");

        let mut on_disk = CliConfig::default();
        on_disk.set("item_name", "Awesome Plugin").unwrap();
        on_disk.save_to(&path).unwrap();

        let mut config = CliConfig::load_from(&path).unwrap();
        config.set("site_url", "https://site.test").unwrap();
        config.save_to(&path).unwrap();

        let mut effective = CliConfig::load_from(&path).unwrap();
        effective.apply_env(|name| match name {
            "KEYMAGIC_SECRET" => Some("from-dotenv".to_string()),
            _ => None,
        });
        assert_eq!(effective.secret, "from-dotenv");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("from-dotenv"));
        let saved = CliConfig::load_from(&path).unwrap();
        assert_eq!(saved.item_name, "Awesome Plugin");
        assert_eq!(saved.site_url, "https://site.test");
        assert_eq!(saved.secret, "keymagic-cli");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.prefix, "keymagic");
    }
}
