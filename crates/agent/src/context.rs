//! Context window assembly.
//!
//! A window is `[system?] + recent turns` when memory is on, or
//! `[system?] + current turn` when it is off. The system entry is present only
//! when the prompt has visible text.

use neura_core::message::{ContextEntry, Message, Role};

/// Builds the ordered `{role, content}` list sent to the chat endpoint.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Assemble a context window.
    ///
    /// `history` is the store tail read *after* the current user turn was
    /// appended. When that tail does not end with the current turn (the
    /// append or the read failed), the turn is added explicitly so the model
    /// always sees it.
    pub fn assemble(
        system_prompt: &str,
        history: &[Message],
        current: &str,
        use_memory: bool,
    ) -> Vec<ContextEntry> {
        let mut window = Vec::with_capacity(history.len() + 2);

        if !system_prompt.trim().is_empty() {
            window.push(ContextEntry::system(system_prompt));
        }

        if use_memory {
            window.extend(history.iter().map(Message::to_entry));
            let ends_with_current = history
                .last()
                .is_some_and(|m| m.role == Role::User && m.content == current);
            if !ends_with_current {
                window.push(ContextEntry::user(current));
            }
        } else {
            window.push(ContextEntry::user(current));
        }

        window
    }
}
