//! Config Command
//!
//! Inspect and initialize reviewlens configuration.
//!
//! Usage:
//!   reviewlens config show [--format json]
//!   reviewlens config path
//!   reviewlens config init [--force]

use std::path::Path;

use crate::cli::ConfigFormat;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the merged effective configuration (API key omitted)
pub fn show(config: &Config, format: ConfigFormat) -> Result<()> {
    let as_json = format == ConfigFormat::Json;
    println!("{}", ConfigLoader::render(config, as_json)?);
    if as_json {
        return Ok(());
    }
    if config.llm.api_key.is_some() {
        println!("# api key: set");
    } else {
        println!("# api key: not set (OPENAI_API_KEY or REVIEWLENS_LLM__API_KEY)");
    }
    Ok(())
}

/// Show configuration paths
pub fn path(project_path: &Path) -> Result<()> {
    ConfigLoader::show_path(project_path);
    Ok(())
}

/// Write a default project configuration
pub fn init(project_path: &Path, force: bool) -> Result<()> {
    let output = Output::new();
    if ConfigLoader::init_project(project_path, force)? {
        output.success("Initialized project configuration");
        output.info(&format!("Config: {}", project_path.display()));
    } else {
        output.warning(&format!(
            "{} already exists (use --force to overwrite)",
            project_path.display()
        ));
    }
    Ok(())
}
