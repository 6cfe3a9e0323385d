//! Show (and optionally persist) the effective configuration.

use headtrack_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, save: bool) -> anyhow::Result<()> {
    println!("Config file: {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);

    if save {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Refusing to save invalid configuration: {e}"))?;
        let path = config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!("\nSaved to {}", path.display());
    }

    Ok(())
}
