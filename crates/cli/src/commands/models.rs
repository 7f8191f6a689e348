//! `neura models` — List installed models.

use neura_config::AppConfig;

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let neura = super::assistant(config).await;
    let models = neura.list_models().await;

    println!("📦 Models at {}", config.host);
    println!("====================");
    if models.is_empty() {
        println!("  No models found. Is the server running? Try `neura status`.");
        return Ok(());
    }

    for model in &models {
        let mut marks = Vec::new();
        if model == &config.model {
            marks.push("chat");
        }
        let vision = config.vision.model.as_str();
        if model == vision || model.split(':').next() == Some(vision) {
            marks.push("vision");
        }
        if marks.is_empty() {
            println!("  • {model}");
        } else {
            println!("  • {model}  ({})", marks.join(", "));
        }
    }

    Ok(())
}
