use super::RepoguardConfig;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use std::path::{Path, PathBuf};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Prefix for environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "REPOGUARD_";

/// Repository-local config file names, in merge order
const LOCAL_CONFIG_FILES: &[&str] = &["repoguard.toml", "repoguard.json", "repoguard.yaml", "repoguard.yml"];

impl RepoguardConfig {
    /// Load the layered configuration
    ///
    /// An explicit file sits above user and repository files; environment
    /// variables always win.
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }
        let config: RepoguardConfig = Self::figment(custom_config)
            .extract()
            .context("Failed to parse configuration")?;
        tracing::debug!("Configuration loaded");
        Ok(config)
    }

    /// The merged provider stack, without extraction
    pub fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(user) = Self::user_config_path() {
            figment = figment
                .merge(Toml::file(&user))
                .merge(Json::file(user.with_extension("json")))
                .merge(Yaml::file(user.with_extension("yaml")));
        }

        for name in LOCAL_CONFIG_FILES {
            figment = match Path::new(name).extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(name)),
                Some("json") => figment.merge(Json::file(name)),
                _ => figment.merge(Yaml::file(name)),
            };
        }

        if let Some(path) = custom_config {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config").join("repoguard").join("config.toml"))
    }
}
