//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/reviewlens/config.toml)
//! 3. Project config (./reviewlens.toml or --config)
//! 4. Environment variables (REVIEWLENS_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, SentimentError};

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the default project path
    pub fn load() -> Result<Config> {
        Self::load_from(&Self::project_config_path())
    }

    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load_from(project_path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(project_path));
        }

        // e.g. REVIEWLENS_LLM__MAX_TOKENS -> llm.max_tokens
        figment = figment.merge(Env::prefixed("REVIEWLENS_").split("__").lowercase(true));

        let config = Self::finish(figment)?;
        Ok(config)
    }

    /// Load configuration from a specific file only (no global file, no env)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Config> {
        let mut config: Config = figment
            .extract()
            .map_err(|e| SentimentError::config(format!("Configuration error: {}", e)))?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/reviewlens/)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "reviewlens").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("reviewlens.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path(project_path: &Path) {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let exists = if project_path.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project_path.display());
    }

    /// Render the effective configuration (api key never included)
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| SentimentError::config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default project config file
    pub fn init_project(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Project config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_project_config())?;
        info!("Created project config: {}", path.display());
        Ok(true)
    }

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# reviewlens configuration
# Environment variables override these values, e.g. REVIEWLENS_LLM__MODEL.
# The API key is read from OPENAI_API_KEY unless llm.api_key is set.

version = "1.0"

[llm]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.3
max_tokens = 2500
timeout_ms = 60000
api_base = "https://api.openai.com/v1"

[pricing]
input_cost_per_1k = 0.00015
output_cost_per_1k = 0.0006

[analysis]
min_reviews = 10
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.max_tokens, 2500);
    }

    #[test]
    fn test_init_then_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reviewlens.toml");

        assert!(ConfigLoader::init_project(&path, false).unwrap());
        assert!(!ConfigLoader::init_project(&path, false).unwrap());

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.analysis.min_reviews, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            "[llm]\nmodel = \"gpt-4.1\"\ntimeout_ms = 5000\n\n[pricing]\ninput_cost_per_1k = 0.002\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.pricing.input_cost_per_1k, 0.002);
        assert_eq!(config.llm.temperature, 0.3);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[llm]\ntemperature = 9.0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_lowered_min_reviews_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lenient.toml");
        fs::write(&path, "[analysis]\nmin_reviews = 5\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_render_hides_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-hidden".to_string());
        let toml = ConfigLoader::render(&config, false).unwrap();
        let json = ConfigLoader::render(&config, true).unwrap();
        assert!(!toml.contains("sk-hidden"));
        assert!(!json.contains("sk-hidden"));
        assert!(toml.contains("gpt-4o-mini"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: This test is the only one touching this variable
        unsafe {
            std::env::set_var("REVIEWLENS_LLM__MAX_TOKENS", "1234");
        }
        let config = ConfigLoader::load_from(&temp_dir.path().join("none.toml")).unwrap();
        assert_eq!(config.llm.max_tokens, 1234);
        unsafe {
            std::env::remove_var("REVIEWLENS_LLM__MAX_TOKENS");
        }
    }
}
