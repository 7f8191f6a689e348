//! `neura analyze` — Describe an image with the vision model.

use neura_config::AppConfig;
use std::path::Path;

pub async fn run(
    config: &AppConfig,
    path: &Path,
    prompt: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let neura = super::assistant(config).await;

    eprint!("  🔍 Analyzing with {}...", config.vision.model);
    let description = neura
        .analyze_image(path, prompt.as_deref().unwrap_or_default())
        .await;
    eprintln!();
    println!("{description}");

    Ok(())
}
