use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "BARISTA_CONFIG";
/// Options are picked with keys 1-9.
pub(crate) const MAX_MENU_OPTIONS: usize = 9;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MenuConfig {
    pub(crate) drinks: Vec<String>,
    pub(crate) sizes: Vec<String>,
    pub(crate) milks: Vec<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            drinks: to_strings(&["Latte", "Americano", "Cappuccino", "Mocha"]),
            sizes: to_strings(&["Small", "Medium", "Large"]),
            milks: to_strings(&["Whole Milk", "Oat Milk", "Almond Milk", "No Milk"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) base_speed: f32,
    pub(crate) sprint_multiplier: f32,
    pub(crate) interaction_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 180.0,
            sprint_multiplier: 1.35,
            interaction_radius: 110.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CustomerConfig {
    pub(crate) speed: f32,
    pub(crate) jitter_min_seconds: f32,
    pub(crate) jitter_max_seconds: f32,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            speed: 80.0,
            jitter_min_seconds: 2.0,
            jitter_max_seconds: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PenaltyConfig {
    pub(crate) idle_threshold_seconds: f32,
    pub(crate) penalty_seconds: f32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            idle_threshold_seconds: 6.0,
            penalty_seconds: 3.0,
        }
    }
}

/// Tunables for one cafe run. Every field has a default, so an override file
/// only names what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CafeConfig {
    pub(crate) menu: MenuConfig,
    pub(crate) player: PlayerConfig,
    pub(crate) customers: CustomerConfig,
    pub(crate) penalty: PenaltyConfig,
    pub(crate) name_max_len: usize,
    pub(crate) seed: u64,
}

impl Default for CafeConfig {
    fn default() -> Self {
        Self {
            menu: MenuConfig::default(),
            player: PlayerConfig::default(),
            customers: CustomerConfig::default(),
            penalty: PenaltyConfig::default(),
            name_max_len: 16,
            seed: 0x00C0_FFEE,
        }
    }
}

impl CafeConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        validate_menu_list("menu.drinks", &self.menu.drinks)?;
        validate_menu_list("menu.sizes", &self.menu.sizes)?;
        validate_menu_list("menu.milks", &self.menu.milks)?;
        validate_positive("player.base_speed", self.player.base_speed)?;
        validate_positive("player.sprint_multiplier", self.player.sprint_multiplier)?;
        validate_positive("player.interaction_radius", self.player.interaction_radius)?;
        validate_positive("customers.speed", self.customers.speed)?;
        validate_positive("customers.jitter_min_seconds", self.customers.jitter_min_seconds)?;
        if self.customers.jitter_max_seconds < self.customers.jitter_min_seconds {
            return Err(ConfigError::Invalid {
                field: "customers.jitter_max_seconds",
                message: format!(
                    "expected at least jitter_min_seconds ({}), got {}",
                    self.customers.jitter_min_seconds, self.customers.jitter_max_seconds
                ),
            });
        }
        validate_positive(
            "penalty.idle_threshold_seconds",
            self.penalty.idle_threshold_seconds,
        )?;
        if !self.penalty.penalty_seconds.is_finite() || self.penalty.penalty_seconds < 0.0 {
            return Err(ConfigError::Invalid {
                field: "penalty.penalty_seconds",
                message: format!(
                    "expected a non-negative number, got {}",
                    self.penalty.penalty_seconds
                ),
            });
        }
        if self.name_max_len == 0 {
            return Err(ConfigError::Invalid {
                field: "name_max_len",
                message: "expected at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Defaults, or the JSON file named by `BARISTA_CONFIG` when it is set.
pub(crate) fn load_config() -> Result<CafeConfig, ConfigError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(path) => load_config_file(Path::new(&path)),
        Err(env::VarError::NotPresent) => {
            let config = CafeConfig::default();
            config.validate()?;
            Ok(config)
        }
        Err(source) => Err(ConfigError::EnvVar {
            var: CONFIG_ENV_VAR,
            source,
        }),
    }
}

pub(crate) fn load_config_file(path: &Path) -> Result<CafeConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw, path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(raw: &str, path: &Path) -> Result<CafeConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, CafeConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

fn validate_menu_list(field: &'static str, entries: &[String]) -> Result<(), ConfigError> {
    if entries.is_empty() || entries.len() > MAX_MENU_OPTIONS {
        return Err(ConfigError::Invalid {
            field,
            message: format!(
                "expected 1 to {MAX_MENU_OPTIONS} entries, got {}",
                entries.len()
            ),
        });
    }
    if entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            field,
            message: "entries must not be blank".to_string(),
        });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            message: format!("expected a positive number, got {value}"),
        })
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
