//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/bankscope/config.toml)
//! 3. Project config (.bankscope/config.toml)
//! 4. Environment variables (BANKSCOPE_* prefix, `__` separates key segments)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{BankscopeError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env_overrides());

        Self::extract(figment)
    }

    /// `BANKSCOPE_` variables with `__` between key segments, so field names
    /// keep their own underscores: `BANKSCOPE_PIPELINE__MAX_WORDS_PER_FIELD`
    /// sets `pipeline.max_words_per_field`.
    fn env_overrides() -> Env {
        Env::prefixed("BANKSCOPE_").split("__").lowercase(true)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| BankscopeError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/bankscope/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("bankscope"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project config directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".bankscope")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, as_json)?);
        Ok(())
    }

    fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| BankscopeError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            BankscopeError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, force)?;
        Ok(global_dir)
    }

    /// Initialize project configuration in the current directory
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        Self::write_default(&project_dir, force)?;
        Ok(project_dir)
    }

    fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Default config file content (TOML)
    fn default_config() -> &'static str {
        r#"# Bankscope Configuration
# Project settings in .bankscope/config.toml override ~/.config/bankscope/config.toml.
# The OpenAI API key is read from OPENAI_API_KEY.

version = "1.0"

[llm]
provider = "openai"
# model = "gpt-4o-mini"
timeout_secs = 120
temperature = 0.0
max_tokens = 512

[pipeline]
# "single-stage" or "two-stage"
topology = "single-stage"
max_content_chars = 10000
max_words_per_field = 4
# Restrict products to a closed list ("Not applicable" is always allowed)
product_catalog = []

[heuristic]
# keywords_path = "keywords.json"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Topology;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_default(dir.path(), false).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.pipeline.topology, Topology::SingleStage);
        assert!(config.pipeline.product_catalog.is_empty());
    }

    #[test]
    fn test_write_default_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::write_default(dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::write_default(dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[pipeline]"));
    }

    #[test]
    fn test_load_from_file_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\nmodel = \"llama3\"\n\n[pipeline]\ntopology = \"two-stage\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3"));
        assert_eq!(config.pipeline.topology, Topology::TwoStage);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntemperature = 5.0\n").unwrap();

        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(BankscopeError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_reach_underscored_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BANKSCOPE_PIPELINE__MAX_WORDS_PER_FIELD", "6");
            jail.set_env("BANKSCOPE_PIPELINE__MAX_CONTENT_CHARS", "2000");
            jail.set_env("BANKSCOPE_LLM__TIMEOUT_SECS", "45");
            jail.set_env("BANKSCOPE_LLM__MODEL", "gpt-4o");

            let config: Config = Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(ConfigLoader::env_overrides())
                .extract()?;

            assert_eq!(config.pipeline.max_words_per_field, 6);
            assert_eq!(config.pipeline.max_content_chars, 2000);
            assert_eq!(config.llm.timeout_secs, 45);
            assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
            Ok(())
        });
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let toml = ConfigLoader::render(&config, false).unwrap();
        assert!(toml.contains("[llm]"));
        let json = ConfigLoader::render(&config, true).unwrap();
        assert!(json.contains("\"pipeline\""));
    }
}
