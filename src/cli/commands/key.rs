//! Key Command
//!
//! Manage the stored API key. Environment variables always take precedence
//! over the stored key.
//!
//! Usage:
//!   serpscope key set <KEY|->
//!   serpscope key clear
//!   serpscope key status

use std::io::{self, BufRead};

use secrecy::SecretString;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::credentials::{CredentialResolver, KeyStore};
use crate::types::{Result, SerpError};

/// Store a key. `-` reads it from stdin so it stays out of shell history.
pub fn set(key: &str) -> Result<()> {
    let key = if key == "-" {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line
    } else {
        key.to_string()
    };

    let store = global_store()?;
    store.save(&SecretString::from(key))?;

    let output = Output::new();
    output.success(&format!("Stored API key in {}", store.path().display()));

    let config = ConfigLoader::load()?;
    if let Some(var) = config
        .model
        .api_key_env
        .iter()
        .find(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()))
    {
        output.warning(&format!("{} is set and takes precedence", var));
    }
    Ok(())
}

pub fn clear() -> Result<()> {
    let store = global_store()?;
    let output = Output::new();
    if store.clear()? {
        output.success(&format!("Removed {}", store.path().display()));
    } else {
        output.info("No stored API key");
    }
    Ok(())
}

/// Report where the key would come from, never the key itself
pub fn status() -> Result<()> {
    let config = ConfigLoader::load()?;
    let resolver = CredentialResolver::from_config(&config.model);
    let output = Output::new();

    match resolver.resolve_with_source()? {
        Some((_, source)) => output.success(&format!("API key found in {}", source)),
        None => {
            output.warning("No API key configured");
            println!("  Checked: {}", config.model.api_key_env.join(", "));
            if let Some(store) = resolver.store() {
                println!("  Store:   {}", store.path().display());
            }
            println!("  Run 'serpscope key set <KEY>' to store one.");
        }
    }
    Ok(())
}

fn global_store() -> Result<KeyStore> {
    KeyStore::global()
        .ok_or_else(|| SerpError::Config("Cannot determine global config directory".to_string()))
}
