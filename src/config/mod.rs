//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/serpscope/config.toml)
//! 3. Project config (.serpscope/config.toml)
//! 4. Environment variables (SERPSCOPE_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigFormat, ConfigLoader};
pub use types::*;
