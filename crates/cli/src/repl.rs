//! Interpretation of interactive input lines.
//!
//! Keywords are matched case-insensitively after trimming and removing one
//! pair of surrounding quotes, so a path dropped into the terminal
//! (`'/home/me/photo.jpg'`) is recognised the same as a typed one.

use std::path::{Path, PathBuf};

const EXIT: &[&str] = &["exit", "quit", "sair", "parar", ":q", "/exit", "/quit"];
const CLEAR: &[&str] = &["clear", "clear memory", "limpar memória", "limpar memoria"];
const STATS: &[&str] = &["stats", "show stats", "estatísticas"];
const MODELS: &[&str] = &["models", "list models", "listar modelos", "modelos"];
const ANALYZE: &[&str] = &["analyze", "analyze image", "analise_imagem"];
const HELP: &[&str] = &["help", "ajuda", "?"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Exit,
    ClearMemory,
    Stats,
    Models,
    /// Ask for an image path, then analyze it
    Analyze,
    Help,
    /// The line named an existing image file
    Image(PathBuf),
    Message(String),
}

/// Remove one pair of matching surrounding quotes.
pub fn strip_quotes(input: &str) -> &str {
    let input = input.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = input
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    input
}

/// Whether `candidate` looks like an image path and the file exists.
pub fn as_image_path(candidate: &str) -> Option<PathBuf> {
    let path = Path::new(candidate);
    let extension = path.extension()?.to_str()?.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) && path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

pub fn parse_command(line: &str) -> ReplCommand {
    let unquoted = strip_quotes(line);
    if unquoted.is_empty() {
        return ReplCommand::Empty;
    }

    let keyword = unquoted.to_lowercase();
    let keyword = keyword.as_str();

    if EXIT.contains(&keyword) {
        ReplCommand::Exit
    } else if CLEAR.contains(&keyword) {
        ReplCommand::ClearMemory
    } else if STATS.contains(&keyword) {
        ReplCommand::Stats
    } else if MODELS.contains(&keyword) {
        ReplCommand::Models
    } else if ANALYZE.contains(&keyword) {
        ReplCommand::Analyze
    } else if HELP.contains(&keyword) {
        ReplCommand::Help
    } else if let Some(path) = as_image_path(unquoted) {
        ReplCommand::Image(path)
    } else {
        ReplCommand::Message(line.trim().to_string())
    }
}

pub const HELP_TEXT: &str = "\
  Commands:
    exit | sair | :q              leave
    clear | limpar memória        forget the conversation
    stats | estatísticas          memory statistics
    models | modelos              installed models
    analyze | analise_imagem      describe an image (asks for the path)
    help | ajuda | ?              this text

  Dropping a .jpg, .jpeg or .png file path also analyzes it.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case_and_quotes() {
        assert_eq!(parse_command("EXIT"), ReplCommand::Exit);
        assert_eq!(parse_command("  'Sair' "), ReplCommand::Exit);
        assert_eq!(parse_command("\"/quit\""), ReplCommand::Exit);
        assert_eq!(parse_command("Limpar Memória"), ReplCommand::ClearMemory);
        assert_eq!(parse_command("limpar memoria"), ReplCommand::ClearMemory);
        assert_eq!(parse_command("Show Stats"), ReplCommand::Stats);
        assert_eq!(parse_command("ESTATÍSTICAS"), ReplCommand::Stats);
        assert_eq!(parse_command("listar modelos"), ReplCommand::Models);
        assert_eq!(parse_command("analise_imagem"), ReplCommand::Analyze);
        assert_eq!(parse_command("?"), ReplCommand::Help);
        assert_eq!(parse_command("Ajuda"), ReplCommand::Help);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_command(""), ReplCommand::Empty);
        assert_eq!(parse_command("   "), ReplCommand::Empty);
        assert_eq!(parse_command("''"), ReplCommand::Empty);
    }

    #[test]
    fn other_text_is_a_message() {
        assert_eq!(
            parse_command("  Qual é a capital da França? "),
            ReplCommand::Message("Qual é a capital da França?".into())
        );
        assert_eq!(
            parse_command("exit now"),
            ReplCommand::Message("exit now".into())
        );
    }

    #[test]
    fn existing_image_path_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foto.JPG");
        std::fs::write(&path, b"pixels").unwrap();

        let quoted = format!("'{}'", path.display());
        assert_eq!(parse_command(&quoted), ReplCommand::Image(path.clone()));
        assert_eq!(
            parse_command(&path.display().to_string()),
            ReplCommand::Image(path)
        );
    }

    #[test]
    fn missing_or_non_image_paths_are_messages() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"text").unwrap();

        assert!(matches!(
            parse_command(&notes.display().to_string()),
            ReplCommand::Message(_)
        ));
        assert!(matches!(
            parse_command("/no/such/photo.png"),
            ReplCommand::Message(_)
        ));
    }

    #[test]
    fn strip_quotes_only_removes_matching_pairs() {
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'a'"), "a");
        assert_eq!(strip_quotes("'a\""), "'a\"");
        assert_eq!(strip_quotes("'"), "'");
    }
}
