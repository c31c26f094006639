//! OpenAI chat-completions backend for the refinement conversation.
//!
//! [`OpenAiClient`] implements [`ideaboard_core::model::ChatModel`]: the
//! session's turns go out as the `messages` array and the first choice's
//! content comes back as the reply.

mod client;

pub mod error;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient, OpenAiConfig};
pub use error::{Error, Result};
