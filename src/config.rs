// ABOUTME: Settings management for lsky-uploader
// ABOUTME: Handles the XDG config directory, TOML settings file, and field validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the XDG config directory for lsky-uploader
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("lsky-uploader");

    fs::create_dir_all(&config_dir)
        .context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub token: String,
    pub strategy_id: u32,
    /// Comma-separated host names whose images are never re-uploaded
    pub domain_blacklist: String,
    pub image_width: u32,
    /// Max images handled per batch, 0 for no limit
    pub limit_count: usize,
    pub upload_clipboard: bool,
    pub delete_local_after_upload: bool,
    pub show_upload_button: bool,
    pub show_delete_button: bool,
    pub show_download_button: bool,
    pub download_path: String,
    pub language: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            token: String::new(),
            strategy_id: 1,
            domain_blacklist: String::new(),
            image_width: 700,
            limit_count: 50,
            upload_clipboard: false,
            delete_local_after_upload: false,
            show_upload_button: true,
            show_delete_button: false,
            show_download_button: false,
            download_path: String::new(),
            language: None,
        }
    }
}

/// Error for a setting value that does not parse; the display text is localized by the caller
#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid number for {key}: {value}")]
    InvalidNumber { key: String, value: String },
    #[error("invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },
}

impl Settings {
    /// Load settings from the default path, or defaults if no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path)
            .context("Failed to read config file")?;
        let settings: Settings = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        Ok(settings.normalized())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&default_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(path, contents)
            .context("Failed to write config file")?;
        Ok(())
    }

    /// Trimmed token, base URL without trailing slashes
    pub fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.token = self.token.trim().to_string();
        self.download_path = self.download_path.trim().to_string();
        self
    }

    pub fn blacklist(&self) -> HashSet<String> {
        self.domain_blacklist
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Set a field by its TOML key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let value = value.trim();
        match key {
            "api_base_url" => self.api_base_url = value.trim_end_matches('/').to_string(),
            "token" => self.token = value.to_string(),
            "strategy_id" => self.strategy_id = parse_number(key, value)?,
            "domain_blacklist" => self.domain_blacklist = value.to_string(),
            "image_width" => self.image_width = parse_number(key, value)?,
            "limit_count" => self.limit_count = parse_number(key, value)?,
            "upload_clipboard" => self.upload_clipboard = parse_bool(key, value)?,
            "delete_local_after_upload" => self.delete_local_after_upload = parse_bool(key, value)?,
            "show_upload_button" => self.show_upload_button = parse_bool(key, value)?,
            "show_delete_button" => self.show_delete_button = parse_bool(key, value)?,
            "show_download_button" => self.show_download_button = parse_bool(key, value)?,
            "download_path" => self.download_path = value.to_string(),
            "language" => {
                self.language = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            _ => return Err(SettingError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingError> {
    value.parse().map_err(|_| SettingError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_serialization() {
        let settings = Settings {
            api_base_url: "https://img.example.com".to_string(),
            ..Settings::default()
        };

        let toml = toml::to_string(&settings).unwrap();
        assert!(toml.contains("img.example.com"));
        assert!(toml.contains("limit_count = 50"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("token = \"abc\"").unwrap();
        assert_eq!(settings.token, "abc");
        assert_eq!(settings.strategy_id, 1);
        assert_eq!(settings.image_width, 700);
        assert!(settings.show_upload_button);
    }

    #[test]
    fn test_normalized_strips_trailing_slashes() {
        let settings = Settings {
            api_base_url: " https://img.example.com// ".to_string(),
            token: " tok ".to_string(),
            ..Settings::default()
        }
        .normalized();

        assert_eq!(settings.api_base_url, "https://img.example.com");
        assert_eq!(settings.token, "tok");
    }

    #[test]
    fn test_blacklist_parsing() {
        let settings = Settings {
            domain_blacklist: "example.com, test.org,,".to_string(),
            ..Settings::default()
        };
        let list = settings.blacklist();
        assert_eq!(list.len(), 2);
        assert!(list.contains("example.com"));
        assert!(list.contains("test.org"));
    }

    #[test]
    fn test_set_rejects_bad_numbers() {
        let mut settings = Settings::default();
        assert!(settings.set("limit_count", "10").is_ok());
        assert_eq!(settings.limit_count, 10);
        assert!(matches!(
            settings.set("strategy_id", "abc"),
            Err(SettingError::InvalidNumber { .. })
        ));
        assert!(matches!(settings.set("nope", "1"), Err(SettingError::UnknownKey(_))));
    }
}
