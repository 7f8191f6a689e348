//! The assistant's request path.
//!
//! For a text turn the orchestrator stores the user message, assembles a
//! context window from the most recent stored turns, and sends it to the chat
//! model in one request. For an image it preprocesses the file and sends it
//! to the vision model instead.
//!
//! - [`ContextAssembler`] builds the `[system?] + history` window
//! - [`VisionDispatcher`] shrinks, encodes and sends images
//! - [`History`] keeps store failures from reaching the caller
//! - [`Neura`] ties them together behind `respond`

pub mod context;
pub mod history;
pub mod orchestrator;
pub mod vision;

#[cfg(test)]
mod test_helpers;

pub use context::ContextAssembler;
pub use history::History;
pub use orchestrator::{
    ImageComment, MemoryStats, NO_RESPONSE, Neura, SessionConfig, VISION_DISABLED, VISION_TAG,
};
pub use vision::{IMAGE_NOT_FOUND, VisionDispatcher, VisionError, VisionSettings};
