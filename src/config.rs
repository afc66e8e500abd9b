//! Configuration Management
//!
//! Handles persistent configuration storage for cloudres.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENDPOINT_ENV: &str = "CLOUDRES_ENDPOINT";
pub const API_VERSION_ENV: &str = "CLOUDRES_API_VERSION";
pub const TOKEN_ENV: &str = "CLOUDRES_TOKEN";

pub const DEFAULT_ENDPOINT: &str = "https://localhost";
pub const DEFAULT_API_VERSION: u32 = 800;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Appliance base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// REST API version sent as `X-API-Version`
    #[serde(default)]
    pub api_version: Option<u32>,
    /// Preferred output format (`json` or `yaml`)
    #[serde(default)]
    pub output: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cloudres").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective endpoint (CLI > env > config > default)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(ENDPOINT_ENV).ok())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective API version (CLI > env > config > default)
    pub fn effective_api_version(&self, cli: Option<u32>) -> u32 {
        cli.or_else(|| {
            std::env::var(API_VERSION_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .or(self.api_version)
        .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Get effective session token (CLI > env); never persisted
    pub fn effective_token(cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| std::env::var(TOKEN_ENV).ok())
    }

    /// Set endpoint and save
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        self.endpoint = Some(endpoint.to_string());
        self.save()
    }

    /// Set API version and save
    pub fn set_api_version(&mut self, api_version: u32) -> Result<()> {
        self.api_version = Some(api_version);
        self.save()
    }
}
