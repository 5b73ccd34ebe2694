// SPDX-License-Identifier: MPL-2.0
//! Persisted settings, loaded from and saved to a `settings.toml` file.
//!
//! The only setting today is an override for the face-mesh model location;
//! when absent, the model is looked up in the platform data directory (see
//! [`crate::landmarks::default_model_path`]).
//!
//! # Examples
//!
//! ```no_run
//! use framefx::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.model_path = Some("/opt/models/face_mesh.onnx".into());
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "framefx";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Override for the face-mesh ONNX model path.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
