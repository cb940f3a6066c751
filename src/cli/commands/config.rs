//! Config Command
//!
//! Manage Bankscope configuration.
//!
//! Usage:
//!   bankscope config show [-g] [-f json]
//!   bankscope config path
//!   bankscope config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str) -> Result<()> {
    if !global {
        // Merged effective config
        return ConfigLoader::show_config(format == "json");
    }

    match ConfigLoader::global_config_path() {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            println!("# Global Config: {}\n", path.display());
            println!("{}", content);
        }
        Some(_) => {
            println!("No global config found.");
            println!("Run 'bankscope config init --global' to create one.");
        }
        None => println!("Cannot determine global config directory."),
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let output = Output::new();
    if global {
        let dir = ConfigLoader::init_global(force)?;
        output.success("Initialized global configuration");
        println!("  Directory: {}", dir.display());
    } else {
        let dir = ConfigLoader::init_project(force)?;
        output.success("Initialized project configuration");
        println!("  Directory: {}", dir.display());
    }
    output.info("The OpenAI API key is read from OPENAI_API_KEY");
    Ok(())
}
