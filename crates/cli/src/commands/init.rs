//! `neura init` — Write a default configuration file.

use neura_config::AppConfig;
use std::path::Path;

pub async fn run(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        println!("⚠️  {} already exists. Use --force to overwrite.", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;

    println!("✅ Wrote {}", path.display());
    println!("   Edit `host` and `model` to match your Ollama setup.");
    Ok(())
}
