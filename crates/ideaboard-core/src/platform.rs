//! The `ChatPlatform` trait: the bot's view of the messaging platform.
//!
//! Implemented by `ideaboard-telegram`. The bot services depend on this
//! abstraction only, which lets tests substitute a recording fake.

use std::future::Future;

use thiserror::Error;

use crate::{
  idea::{ChatId, MessageRef, UserId},
  markup::{InlineKeyboard, Invoice, OutgoingMessage},
};

/// Failure reported by a [`ChatPlatform`] call.
#[derive(Debug, Error)]
pub enum PlatformError {
  /// An edit was rejected because the new content equals the old one.
  #[error("message is not modified")]
  NotModified,

  /// The target message or chat no longer exists.
  #[error("message not found: {0}")]
  NotFound(String),

  /// The platform refused the request.
  #[error("platform rejected request ({code}): {description}")]
  Api { code: i64, description: String },

  #[error("transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PlatformError {
  pub fn is_not_modified(&self) -> bool { matches!(self, PlatformError::NotModified) }
}

/// Outbound operations the bot needs from the chat platform.
pub trait ChatPlatform: Send + Sync + 'static {
  /// Send a message and return where it landed.
  fn send_message<'a>(
    &'a self,
    chat: &'a ChatId,
    message: &'a OutgoingMessage,
  ) -> impl Future<Output = Result<MessageRef, PlatformError>> + Send + 'a;

  /// Replace the text (and keyboard, if given) of a sent message.
  fn edit_message_text<'a>(
    &'a self,
    target: &'a MessageRef,
    message: &'a OutgoingMessage,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;

  /// Replace only the inline keyboard of a sent message.
  fn edit_keyboard<'a>(
    &'a self,
    target: &'a MessageRef,
    keyboard: &'a InlineKeyboard,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;

  fn pin_message<'a>(
    &'a self,
    target: &'a MessageRef,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;

  /// Acknowledge a button press, optionally with a short toast.
  fn answer_callback<'a>(
    &'a self,
    callback_id: &'a str,
    text: Option<&'a str>,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;

  /// Approve (`error == None`) or reject a checkout before it is charged.
  fn answer_pre_checkout<'a>(
    &'a self,
    query_id: &'a str,
    error: Option<&'a str>,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;

  fn send_invoice<'a>(
    &'a self,
    user: UserId,
    invoice: &'a Invoice,
  ) -> impl Future<Output = Result<(), PlatformError>> + Send + 'a;
}
