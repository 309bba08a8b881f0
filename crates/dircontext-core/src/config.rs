// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration management.
//!
//! Sources, lowest priority first:
//!
//! 1. Defaults
//! 2. `<config dir>/dircontext/config.toml`
//! 3. `./dircontext.toml`
//! 4. `DIRCONTEXT_*` environment variables

use crate::error::{ContextError, Result};
use crate::mode::ModePolicy;
use crate::resolver::NodeDirectoryResolver;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project-level config file name
pub const PROJECT_CONFIG_FILE: &str = "dircontext.toml";

/// Prefix for environment overrides
const ENV_PREFIX: &str = "DIRCONTEXT_";

/// Configuration for context making
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContextConfig {
    /// Reject unrecognized timing modes instead of loading immediately
    pub strict_modes: bool,

    /// Directories searched for bare package requests
    pub modules: Vec<String>,

    /// Request prefix rewrites (name -> target)
    pub alias: BTreeMap<String, String>,

    /// Log level for the command line tool
    pub loglevel: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            strict_modes: false,
            modules: vec!["node_modules".to_string()],
            alias: BTreeMap::new(),
            loglevel: "warn".to_string(),
        }
    }
}

impl ContextConfig {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        let mut config = ContextConfig::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                config.merge_from_file(&user_config_path)?;
            }
        }

        let project_config = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            config.merge_from_file(&project_config)?;
        }

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from defaults plus one explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = ContextConfig::default();
        config.merge_from_file(path)?;
        config.load_from_env();
        Ok(config)
    }

    /// Merge the keys present in a TOML file over the current values.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContextError::Config(format!("{}: {}", path.display(), e)))?;
        self.merge_from_str(&content)
            .map_err(|e| ContextError::Config(format!("{}: {}", path.display(), e)))
    }

    fn merge_from_str(&mut self, content: &str) -> std::result::Result<(), toml::de::Error> {
        let overlay: PartialConfig = toml::from_str(content)?;

        if let Some(strict_modes) = overlay.strict_modes {
            self.strict_modes = strict_modes;
        }
        if let Some(modules) = overlay.modules {
            self.modules = modules;
        }
        if let Some(loglevel) = overlay.loglevel {
            self.loglevel = loglevel;
        }
        self.alias.extend(overlay.alias);

        Ok(())
    }

    /// Load configuration from environment variables.
    fn load_from_env(&mut self) {
        self.apply_env(std::env::vars());
    }

    fn apply_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Some(name) = config_key.strip_prefix("ALIAS_") {
                    self.alias.insert(name.to_lowercase().replace('_', "-"), value);
                } else {
                    let config_key = config_key.to_lowercase().replace('_', "-");
                    self.set(&config_key, &value);
                }
            }
        }
    }

    /// Set a configuration value. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "strict-modes" => self.strict_modes = value == "true",
            "modules" => {
                self.modules = value
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect();
            }
            "loglevel" => self.loglevel = value.to_string(),
            _ => {
                if let Some(name) = key.strip_prefix("alias.") {
                    self.alias.insert(name.to_string(), value.to_string());
                } else {
                    tracing::debug!("ignoring unknown config key '{}'", key);
                }
            }
        }
    }

    /// Get a configuration value.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "strict-modes" => Some(self.strict_modes.to_string()),
            "modules" => Some(self.modules.join(",")),
            "loglevel" => Some(self.loglevel.clone()),
            _ => key
                .strip_prefix("alias.")
                .and_then(|name| self.alias.get(name).cloned()),
        }
    }

    /// Mode policy implied by `strict_modes`
    pub fn mode_policy(&self) -> ModePolicy {
        if self.strict_modes {
            ModePolicy::Strict
        } else {
            ModePolicy::Lenient
        }
    }

    /// Resolver configured with these module directories and aliases
    pub fn resolver(&self) -> NodeDirectoryResolver {
        self.alias.iter().fold(
            NodeDirectoryResolver::new().with_modules(self.modules.clone()),
            |resolver, (name, target)| resolver.with_alias(name.as_str(), target.as_str()),
        )
    }
}

/// File overlay: only the keys a file actually sets
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct PartialConfig {
    #[serde(alias = "strict_modes")]
    strict_modes: Option<bool>,
    modules: Option<Vec<String>>,
    alias: BTreeMap<String, String>,
    loglevel: Option<String>,
}

/// Get the user config path.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dircontext").join("config.toml"))
}
