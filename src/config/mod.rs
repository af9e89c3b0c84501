use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    core::utils::{ensure_dir, PathResolver},
    currency::{CurrencyCode, LocaleConfig},
    errors::{FinhabitError, Result},
    storage::json_backend::{tmp_path, write_atomic},
};

/// User preferences stored as `config.json` in the base directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub fraction_digits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-IN".into(),
            currency: "INR".into(),
            fraction_digits: 0,
            default_year: None,
            data_file: None,
        }
    }
}

impl Config {
    pub fn to_locale(&self) -> LocaleConfig {
        LocaleConfig::for_tag(
            &self.locale,
            CurrencyCode::new(self.currency.clone()),
            self.fraction_digits,
        )
    }

    /// Applies a `key value` pair from the CLI `config` command.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, value)?,
            "currency" => self.currency = non_empty(key, value)?.to_uppercase(),
            "fraction_digits" => {
                self.fraction_digits = value
                    .parse::<u32>()
                    .ok()
                    .filter(|digits| *digits <= 4)
                    .ok_or_else(|| {
                        FinhabitError::ConfigError(format!("invalid fraction_digits `{value}`"))
                    })?;
            }
            "default_year" => {
                self.default_year = match value {
                    "" | "none" => None,
                    raw => Some(raw.parse::<i32>().map_err(|_| {
                        FinhabitError::ConfigError(format!("invalid year `{raw}`"))
                    })?),
                };
            }
            "data_file" => {
                self.data_file = match value {
                    "" | "none" => None,
                    raw => Some(PathBuf::from(raw)),
                };
            }
            other => {
                return Err(FinhabitError::ConfigError(format!(
                    "unknown setting `{other}`"
                )))
            }
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(FinhabitError::ConfigError(format!("{key} cannot be empty")));
    }
    Ok(value.to_string())
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Falls back to defaults when no file has been written yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            FinhabitError::ConfigError(format!("{}: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
