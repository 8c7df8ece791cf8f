mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./clipforge.toml",
        "./config.toml",
        "~/.config/clipforge/config.toml",
        "/etc/clipforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    config
        .normalization
        .profile()
        .validate()
        .context("Invalid [normalization] section")?;

    if config.normalization.max_workers == Some(0) {
        anyhow::bail!("normalization.max_workers cannot be 0");
    }

    config
        .transition
        .spec()
        .context("Invalid [transition] section")?;

    if config.workspace.output_name.trim().is_empty() {
        anyhow::bail!("workspace.output_name cannot be empty");
    }

    for tool in clipforge_av::REQUIRED_TOOLS {
        if let Some(path) = config.tools.configured_path(tool) {
            if !path.is_file() {
                tracing::warn!("Configured {} path does not exist: {:?}", tool, path);
            }
        }
    }

    Ok(())
}
