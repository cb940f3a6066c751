//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/bankscope/config.toml)
//! 3. Project config (.bankscope/config.toml)
//! 4. Environment variables (BANKSCOPE_*, e.g. BANKSCOPE_LLM__TIMEOUT_SECS)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
