use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unable to write settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub user: UserSettings,
    #[serde(default)]
    pub audio: AudioSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub font_size: f32,
}

/// Output level and keying shape. Morse timing itself is fixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// 0.0 - 1.0
    pub master_volume: f32,
    /// Attack/release ramp in milliseconds, avoids key clicks
    pub ramp_ms: f32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self { font_size: 16.0 }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            ramp_ms: 5.0,
        }
    }
}

pub struct SettingsLoadResult {
    pub settings: AppSettings,
    pub notice: Option<String>,
}

impl AppSettings {
    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("morse_code").join("settings.toml")
        } else {
            PathBuf::from("settings.toml")
        }
    }

    /// Load settings from the default config path, or return defaults if not found
    pub fn load_with_notice() -> SettingsLoadResult {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`. An unreadable file is moved aside and replaced by defaults.
    pub fn load_from(path: &Path) -> SettingsLoadResult {
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                SettingsLoadResult {
                    settings,
                    notice: None,
                }
            }
            Err(e) => {
                let mut notice = None;
                if path.exists() {
                    log::warn!("Unable to load settings at {}: {}", path.display(), e);
                    notice = Some(match backup_settings_file(path) {
                        Some(backup_path) => format!(
                            "Settings file was reset due to an incompatible format. Backup saved to {}",
                            backup_path.display()
                        ),
                        None => {
                            "Settings file was reset due to an incompatible format.".to_string()
                        }
                    });
                } else {
                    log::info!("No settings at {}, using defaults", path.display());
                }

                SettingsLoadResult {
                    settings: Self::default(),
                    notice,
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

fn backup_settings_file(path: &Path) -> Option<PathBuf> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())?;
    let file_name = path.file_name()?.to_string_lossy();
    let backup_name = format!("{}.bak.{}", file_name, timestamp);
    let backup_path = path.with_file_name(backup_name);
    if std::fs::rename(path, &backup_path).is_ok() {
        Some(backup_path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "morse_code_config_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: AppSettings = toml::from_str("[audio]\nmaster_volume = 0.3\n").unwrap();
        assert_eq!(settings.audio.master_volume, 0.3);
        assert_eq!(settings.audio.ramp_ms, 5.0);
        assert_eq!(settings.user, UserSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("save");
        let path = dir.join("nested").join("settings.toml");

        let mut settings = AppSettings::default();
        settings.user.font_size = 20.0;
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path);
        assert_eq!(loaded.settings, settings);
        assert!(loaded.notice.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_gives_defaults_without_notice() {
        let dir = temp_dir("missing");
        let loaded = AppSettings::load_from(&dir.join("settings.toml"));
        assert_eq!(loaded.settings, AppSettings::default());
        assert!(loaded.notice.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = temp_dir("corrupt");
        let path = dir.join("settings.toml");
        std::fs::write(&path, "audio = [not toml").unwrap();

        let loaded = AppSettings::load_from(&path);
        assert_eq!(loaded.settings, AppSettings::default());
        assert!(loaded.notice.unwrap().contains("Backup saved"));
        assert!(!path.exists());

        let backups = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("settings.toml.bak."))
            .count();
        assert_eq!(backups, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
