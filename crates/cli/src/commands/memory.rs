//! `neura memory` — Conversation store maintenance.

use neura_config::AppConfig;
use neura_core::memory::MessageStore;

pub async fn stats(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store(config).await?;
    let count = store.count().await?;

    println!("🧠 Memory Statistics");
    println!("====================");
    println!("  Messages:       {count}");
    println!("  Context limit:  {}", config.memory.context_limit);
    println!(
        "  Memory:         {}",
        if config.memory.enabled { "on" } else { "off" }
    );

    let db_path = config.db_path();
    match std::fs::metadata(&db_path) {
        Ok(meta) => {
            let size_kb = meta.len() as f64 / 1024.0;
            println!("  DB file:        {} ({:.1} KB)", db_path.display(), size_kb);
        }
        Err(_) => println!("  DB file:        {} (not created yet)", db_path.display()),
    }

    Ok(())
}

pub async fn clear(config: &AppConfig, confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This deletes every stored message in {}.", config.db_path().display());
        println!("   Run again with --confirm to proceed.");
        return Ok(());
    }

    let store = super::open_store(config).await?;
    let removed = store.count().await?;
    store.clear().await?;
    println!("🧹 Removed {removed} message(s).");

    Ok(())
}

pub async fn show(config: &AppConfig, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store(config).await?;
    let messages = store.recent(limit).await?;

    if messages.is_empty() {
        println!("   No messages stored.");
        return Ok(());
    }

    for message in &messages {
        let preview: String = message.content.chars().take(100).collect();
        let ellipsis = if message.content.chars().count() > 100 { "…" } else { "" };
        println!(
            "  {:>4}  {}  {:<9} {preview}{ellipsis}",
            message.id,
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.role.as_str(),
        );
    }

    Ok(())
}
