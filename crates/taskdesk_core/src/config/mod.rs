use crate::error::TaskError;
use crate::model::Priority;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKDESK_CONFIG_PATH";

/// ANSI colors for rendering. The priority-to-color mapping lives here, on
/// the presentation side; the store knows nothing about display.
#[derive(Debug, Clone)]
pub struct Palette {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn paint_priority(&self, priority: Priority, text: &str) -> String {
        let color = match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        };
        self.wrap(color, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.wrap(self.muted, text)
    }

    fn wrap(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name) {
        Some(ref name) if name == "classic" => Palette {
            high: "\x1b[31m",
            medium: "\x1b[33m",
            low: "\x1b[32m",
            muted: "\x1b[38;5;245m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "noir" => Palette {
            high: "\x1b[38;5;203m",
            medium: "\x1b[38;5;215m",
            low: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            high: "",
            medium: "",
            low: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        return Some("default".into());
    }

    match trimmed {
        "plain" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

/// A broken config file must never keep the app from starting, so loading
/// degrades to defaults and hands the error back for the caller to log.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<TaskError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
}

pub fn config_path() -> Result<PathBuf, TaskError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| TaskError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskdesk")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| TaskError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskdesk")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, TaskError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| TaskError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        TaskError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.as_deref().and_then(canonical_theme_name);
    Ok(config)
}

/// Builds overrides from raw `KEY=VALUE` strings. Accepted keys are `theme`
/// and `aliases.<name>` (`alias.<name>` works too).
pub fn parse_overrides(raws: &[String]) -> Result<ConfigOverrides, TaskError> {
    let mut overrides = ConfigOverrides::default();

    for raw in raws {
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            TaskError::invalid_input(format!("override '{}' must be KEY=VALUE", raw.trim()))
        })?;
        let key = key.trim();
        let value = value.trim().to_string();

        if key.eq_ignore_ascii_case("theme") {
            overrides.theme = Some(value);
        } else if let Some(alias) = key
            .strip_prefix("aliases.")
            .or_else(|| key.strip_prefix("alias."))
        {
            let alias = alias.trim();
            if alias.is_empty() {
                return Err(TaskError::invalid_input(
                    "aliases override requires an alias name",
                ));
            }
            overrides.aliases.insert(alias.to_string(), value);
        } else {
            return Err(TaskError::invalid_input(format!(
                "unknown config field '{key}'"
            )));
        }
    }

    Ok(overrides)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    merged
}
