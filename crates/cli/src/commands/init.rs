//! Initialize .jshunter.toml configuration

use anyhow::Result;
use jshunter_core::config::CONFIG_FILE_NAME;
use jshunter_core::JshunterConfig;
use std::path::Path;

pub fn run(path: Option<&Path>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!("⚠️  {} already exists at {:?}", CONFIG_FILE_NAME, config_path);
        return Ok(());
    }

    let config = JshunterConfig::default();
    config.save(&config_path)?;

    println!("✅ Created {} at {:?}", CONFIG_FILE_NAME, config_path);
    println!("\nTune thresholds and modules, then run:");
    println!("  jshunter path/to/bundle.js");

    Ok(())
}
