use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::hosts::{JsxFramework, TransformOptions};

pub const CONFIG_FILE_NAME: &str = ".oliverc.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Glob patterns, relative to each source directory, that `build` skips.
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub jsx_framework: JsxFramework,
    /// Force template-safe mode on or off for every host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_safe: Option<bool>,
    /// Force the forward target search on or off for every host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_fallback: Option<bool>,
    /// Copy files that no host handles into the output directory.
    #[serde(default = "default_copy_unsupported")]
    pub copy_unsupported: bool,
}

fn default_copy_unsupported() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            jsx_framework: JsxFramework::default(),
            template_safe: None,
            forward_fallback: None,
            copy_unsupported: default_copy_unsupported(),
        }
    }
}

impl Config {
    /// Returns an error if any glob pattern in `ignores` is invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }
        Ok(())
    }

    pub fn ignore_patterns(&self) -> Result<Vec<Pattern>> {
        self.ignores
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern: \"{}\"", p)))
            .collect()
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            jsx_framework: self.jsx_framework,
            template_safe: self.template_safe,
            forward_fallback: self.forward_fallback,
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
