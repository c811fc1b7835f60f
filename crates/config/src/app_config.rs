// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use crate::validation::validate_hex_key;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "contrib.config.yaml";
pub const ENV_PREFIX: &str = "CONTRIB_";

/// Shared development key. Anything beyond a local simulation should set its own.
pub const DEV_VERIFIER_KEY: &str = "0x636f6e747269622d6465762d6b65792d30303031";

/// Where protocol snapshots are kept
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DbConfig {
    #[default]
    InMem,
    Sled { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    /// Hex encoded secret shared with the decryption oracle
    pub verifier_key: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            verifier_key: DEV_VERIFIER_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    pub deduplicate: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { deduplicate: true }
    }
}

/// The config actually used throughout the app
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Node name used when logging events
    pub name: String,
    pub db: DbConfig,
    pub oracle: OracleConfig,
    pub events: EventsConfig,
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub log_level: String,
    #[serde(skip)]
    config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "contrib".to_string(),
            db: DbConfig::default(),
            oracle: OracleConfig::default(),
            events: EventsConfig::default(),
            log_level: "info".to_string(),
            config_file: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        validate_hex_key(&self.oracle.verifier_key).context("Invalid oracle configuration")
    }

    /// The file this config was read from, if any
    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Could not serialize configuration")
    }
}

pub struct OsDirs;

impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("contrib"))
            .context("Contrib may only be run on an OS that can provide a config dir")
    }
}

/// Layer defaults, the YAML file if there is one and `CONTRIB_` environment variables
pub fn build_figment(config_file: Option<&PathBuf>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = config_file {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the config at the given file or the default location if not provided
pub fn load_config(config_file: Option<String>) -> Result<AppConfig> {
    let resolved = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir()?,
        DEFAULT_CONFIG_NAME,
        config_file.clone().map(PathBuf::from),
    );

    let found = if resolved.exists() {
        Some(resolved)
    } else if config_file.is_some() {
        anyhow::bail!("Configuration file not found at {}", resolved.display());
    } else {
        None
    };

    let mut config: AppConfig = build_figment(found.as_ref())
        .extract()
        .context("Could not parse configuration")?;
    config.validate()?;
    config.config_file = found;
    Ok(config)
}
