//! `neura ask` — Single message mode.

use neura_config::AppConfig;
use std::path::PathBuf;

pub async fn run(
    config: &AppConfig,
    message: &str,
    image: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let neura = super::assistant(config).await;

    eprint!("  Thinking...");
    let reply = neura.respond(message, image.as_deref()).await;
    eprint!("\r              \r");
    println!("{reply}");

    Ok(())
}
