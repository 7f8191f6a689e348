//! `neura status` — Show configuration and server health.

use neura_config::AppConfig;
use std::path::Path;

pub async fn run(config: &AppConfig, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let neura = super::assistant(config).await;

    println!("🧠 Neura Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Server:       {}", config.host);
    println!("  Model:        {}", config.model);
    println!("  Temperature:  {}", config.temperature);
    println!(
        "  Vision:       {}",
        if config.vision.enabled {
            format!("{} (max {}px)", config.vision.model, config.vision.max_dimension)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  Memory:       {}",
        if config.memory.enabled {
            format!("last {} messages", config.memory.context_limit)
        } else {
            "off".to_string()
        }
    );
    println!("  Database:     {}", config.db_path().display());
    if !config.headers.is_empty() {
        let names: Vec<&str> = config.headers.keys().map(String::as_str).collect();
        println!("  Headers:      {}", names.join(", "));
    }

    println!("\n  {}", config_file_line(config_path));

    if neura.health_check().await {
        println!("  ✅ Inference server reachable");
    } else {
        println!("  ❌ Inference server unreachable at {}", config.host);
    }

    Ok(())
}

/// Whether the config file that was actually loaded exists.
fn config_file_line(path: &Path) -> String {
    if path.exists() {
        format!("✅ Config file found: {}", path.display())
    } else {
        format!("⚠️  No config file at {}, using defaults", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_given_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let line = config_file_line(&path);
        assert!(line.starts_with("⚠️"), "got {line}");
        assert!(line.contains("custom.toml"));

        std::fs::write(&path, AppConfig::default_toml()).unwrap();
        let line = config_file_line(&path);
        assert!(line.starts_with("✅"), "got {line}");
        assert!(line.contains(&path.display().to_string()));
    }
}
