//! `neura chat` — Interactive conversation.

use crate::repl::{self, ReplCommand};
use neura_agent::{ImageComment, Neura};
use neura_config::AppConfig;
use std::io::Write;
use std::path::Path;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(
    mut config: AppConfig,
    fresh: bool,
    no_memory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if no_memory {
        config.memory.enabled = false;
    }

    let neura = super::assistant(&config).await;

    if !neura.health_check().await {
        eprintln!();
        eprintln!("  ❌ Cannot reach the inference server at {}", config.host);
        eprintln!();
        eprintln!("  Start it with `ollama serve`, or pass --remote to use the tunnel:");
        eprintln!("    {}", config.tunnel.url);
        eprintln!();
        return Err("inference server unreachable".into());
    }

    if fresh {
        neura.clear_memory().await;
    }

    println!();
    println!("  🧠 Neura online");
    println!();
    println!("  Server:   {}", config.host);
    println!("  Model:    {}", config.model);
    println!(
        "  Vision:   {}",
        if config.vision.enabled { config.vision.model.as_str() } else { "disabled" }
    );
    println!(
        "  Memory:   {}",
        if config.memory.enabled {
            format!("last {} messages", config.memory.context_limit)
        } else {
            "off".to_string()
        }
    );
    println!();
    println!("  Type a message, 'help' for commands, 'exit' to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        prompt("  Você > ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match repl::parse_command(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Help => {
                println!("{}", repl::HELP_TEXT);
                println!();
            }
            ReplCommand::ClearMemory => {
                neura.clear_memory().await;
                println!("  🧹 Memory cleared.");
                println!();
            }
            ReplCommand::Stats => {
                let stats = neura.stats().await;
                println!("  Messages stored: {}", stats.message_count);
                println!("  Context limit:   {}", stats.context_limit);
                println!(
                    "  Memory:          {}",
                    if stats.use_memory { "on" } else { "off" }
                );
                println!();
            }
            ReplCommand::Models => {
                let models = neura.list_models().await;
                if models.is_empty() {
                    println!("  No models found.");
                }
                for model in models {
                    println!("  • {model}");
                }
                println!();
            }
            ReplCommand::Analyze => {
                prompt("  Caminho da imagem > ")?;
                let Some(raw) = lines.next_line().await? else {
                    break;
                };
                let path = repl::strip_quotes(&raw);
                if path.is_empty() {
                    continue;
                }
                discuss_image(&neura, Path::new(path)).await;
            }
            ReplCommand::Image(path) => discuss_image(&neura, &path).await,
            ReplCommand::Message(text) => {
                eprint!("  ...");
                let reply = neura.respond(&text, None).await;
                eprint!("\r     \r");
                print_reply(&reply);
            }
        }
    }

    println!();
    println!("  Até logo! 👋");
    println!();

    Ok(())
}

/// Describe the image, then let the chat model comment on it.
async fn discuss_image(neura: &Neura, path: &Path) {
    eprint!("  🔍 Analyzing {}...", path.display());
    let ImageComment {
        description,
        comment,
    } = neura.describe_then_comment(path, "").await;
    eprintln!();

    println!("  🖼️  {description}");
    if let Some(comment) = comment {
        print_reply(&comment);
    } else {
        println!();
    }
}

fn print_reply(reply: &str) {
    println!();
    for line in reply.lines() {
        println!("  Neura > {line}");
    }
    println!();
}

fn prompt(label: &str) -> std::io::Result<()> {
    print!("{label}");
    std::io::stdout().flush()
}
