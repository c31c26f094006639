//! Telegram Bot API client for Ideaboard.
//!
//! [`TelegramClient`] implements [`ideaboard_core::platform::ChatPlatform`]
//! over the JSON Bot API, and additionally exposes the update-delivery calls
//! (`getUpdates`, `setWebhook`) the bot binary needs to receive events.
//! Raw [`types::Update`]s are turned into platform-neutral
//! [`ideaboard_core::event::Event`]s by [`convert::to_event`].

pub mod client;
pub mod convert;
pub mod error;
pub mod outgoing;
pub mod types;

pub use client::TelegramClient;
pub use convert::to_event;
pub use error::{Error, Result};
