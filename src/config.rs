use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio_system::group::{GroupAttribute, AMBIANCE, OTHER};
use crate::error::ConfigError;

/// Configured settings for one audio group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub name: String,

    /// Volume 0-100, defaults to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,

    /// Pan -100..100, defaults to 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<i32>,
}

impl GroupSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: None,
            pan: None,
        }
    }

    fn attribute(&self, attribute: GroupAttribute) -> Option<i32> {
        match attribute {
            GroupAttribute::Volume => self.volume,
            GroupAttribute::Pan => self.pan,
        }
    }

    fn attribute_mut(&mut self, attribute: GroupAttribute) -> &mut Option<i32> {
        match attribute {
            GroupAttribute::Volume => &mut self.volume,
            GroupAttribute::Pan => &mut self.pan,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Global mute. Muted streams keep playing at zero volume.
    #[serde(default)]
    pub muted: bool,

    /// Only ambiance survives while the window is unfocused
    #[serde(default = "default_true")]
    pub foreground_only: bool,

    /// Prefer the classic variant of every sound
    #[serde(default)]
    pub classic_audio: bool,

    /// Surface resolution failures to the user
    #[serde(default)]
    pub debug: bool,

    /// Directory sound references are resolved against
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,

    /// Companion click played on volume changes and group cycling
    #[serde(default)]
    pub click_sound: Option<String>,

    /// Audio groups, in cycling order
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupSettings>,
}

fn default_true() -> bool {
    true
}

fn default_sound_dir() -> PathBuf {
    PathBuf::from("sounds")
}

fn default_groups() -> Vec<GroupSettings> {
    vec![
        GroupSettings::new(AMBIANCE),
        GroupSettings::new("music"),
        GroupSettings::new(OTHER),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            muted: false,
            foreground_only: true,
            classic_audio: false,
            debug: false,
            sound_dir: default_sound_dir(),
            click_sound: None,
            groups: default_groups(),
        }
    }
}

impl Config {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate configuration from a file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Default config file location
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("SoundGroups"))
            .unwrap_or_else(|| PathBuf::from("config"))
            .join("config.json")
    }

    /// Check group names and attribute ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(ConfigError::Invalid("group name must not be empty".to_string()));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate group: {}", group.name)));
            }
            for attribute in [GroupAttribute::Volume, GroupAttribute::Pan] {
                if let Some(value) = group.attribute(attribute) {
                    let (min, max) = attribute.range();
                    if !(min..=max).contains(&value) {
                        return Err(ConfigError::Invalid(format!(
                            "{} of group {} out of range: {}",
                            attribute, group.name, value
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip the mute flag, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Configured attribute of a group, if any
    pub fn group_attribute(&self, group: &str, attribute: GroupAttribute) -> Option<i32> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.attribute(attribute))
    }

    /// Configured attribute of a group, or the attribute's default
    pub fn attribute_or_default(&self, group: &str, attribute: GroupAttribute) -> i32 {
        self.group_attribute(group, attribute)
            .unwrap_or_else(|| attribute.default_value())
    }

    /// Store an attribute, clamped to its range. Unknown groups are appended.
    pub fn set_group_attribute(&mut self, group: &str, attribute: GroupAttribute, value: i32) {
        let index = match self.groups.iter().position(|g| g.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(GroupSettings::new(group));
                self.groups.len() - 1
            }
        };
        *self.groups[index].attribute_mut(attribute) = Some(attribute.clamp(value));
    }

    /// Group names in cycling order
    pub fn audio_groups(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.muted);
        assert!(config.foreground_only);
        assert!(!config.classic_audio);
        assert_eq!(config.audio_groups(), vec!["ambiance", "music", "other"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attribute_defaults() {
        let config = Config::default();
        assert_eq!(config.group_attribute("music", GroupAttribute::Volume), None);
        assert_eq!(config.attribute_or_default("music", GroupAttribute::Volume), 100);
        assert_eq!(config.attribute_or_default("music", GroupAttribute::Pan), 0);
    }

    #[test]
    fn test_set_attribute_clamps_and_appends() {
        let mut config = Config::default();
        config.set_group_attribute("music", GroupAttribute::Volume, 140);
        assert_eq!(config.group_attribute("music", GroupAttribute::Volume), Some(100));

        config.set_group_attribute("sfx", GroupAttribute::Pan, -30);
        assert_eq!(config.group_attribute("sfx", GroupAttribute::Pan), Some(-30));
        assert_eq!(config.audio_groups().last(), Some(&"sfx"));
    }

    #[test]
    fn test_toggle_mute() {
        let mut config = Config::default();
        assert!(config.toggle_mute());
        assert!(config.is_muted());
        assert!(!config.toggle_mute());
    }

    #[test]
    fn test_validate_rejects_bad_groups() {
        let mut config = Config::default();
        config.groups.push(GroupSettings::new("music"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.groups[0].volume = Some(120);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.groups.push(GroupSettings::new("  "));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_group_attribute("ambiance", GroupAttribute::Volume, 40);
        config.click_sound = Some("ui/click.ogg".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.group_attribute("ambiance", GroupAttribute::Volume), Some(40));
        assert_eq!(loaded.click_sound.as_deref(), Some("ui/click.ogg"));
        assert_eq!(loaded.groups, config.groups);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "muted": true }"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.muted);
        assert!(loaded.foreground_only);
        assert_eq!(loaded.groups.len(), 3);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "groups": [ { "name": "music", "pan": 300 } ] }"#).unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            Config::load_from(&dir.path().join("missing.json")),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
