//! Config Command
//!
//! Manage SerpScope configuration.
//!
//! Usage:
//!   serpscope config show [-f toml|json]
//!   serpscope config path
//!   serpscope config init [--force]

use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::Result;

/// Show the effective configuration (merged from all sources)
pub fn show(format: ConfigFormat) -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init(force: bool) -> Result<()> {
    let path = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Config: {}", path.display());
    Ok(())
}
