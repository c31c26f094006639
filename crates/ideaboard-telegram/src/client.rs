//! [`TelegramClient`]: Bot API calls over HTTPS.

use std::time::Duration;

use ideaboard_core::{
  idea::{ChatId, MessageRef, UserId},
  markup::{InlineKeyboard, Invoice, OutgoingMessage},
  platform::{ChatPlatform, PlatformError},
};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  outgoing::{
    ALLOWED_UPDATES, AnswerCallbackQuery, AnswerPreCheckoutQuery, DeleteWebhook,
    EditMessageReplyMarkup, EditMessageText, GetChat, GetUpdates, PinChatMessage, ReplyMarkup,
    SendInvoice, SendMessage, SetWebhook,
  },
  types::{ApiResponse, Chat, Message, UpdateBatch},
};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Seconds `getUpdates` holds the connection open waiting for updates.
pub const LONG_POLL_SECS: u64 = 30;

/// Slack on top of the long-poll timeout before a request is abandoned.
const REQUEST_MARGIN_SECS: u64 = 15;

/// Async client for the Telegram Bot API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramClient {
  client: Client,
  /// `{api_base}/bot{token}`
  base:   String,
}

impl<T> ApiResponse<T> {
  fn into_result(self, method: &'static str) -> Result<T> {
    if !self.ok {
      return Err(Error::Api {
        method,
        code: self.error_code.unwrap_or_default(),
        description: self.description.unwrap_or_default(),
      });
    }
    self.result.ok_or(Error::MissingResult(method))
  }
}

impl TelegramClient {
  pub fn new(token: &str) -> Result<Self> { Self::with_api_base(DEFAULT_API_BASE, token) }

  /// Client against a Bot API server other than the public one.
  pub fn with_api_base(api_base: &str, token: &str) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(LONG_POLL_SECS + REQUEST_MARGIN_SECS))
      .build()?;
    Ok(Self {
      client,
      base: format!("{}/bot{token}", api_base.trim_end_matches('/')),
    })
  }

  fn method_url(&self, method: &str) -> String { format!("{}/{method}", self.base) }

  /// `POST /bot<token>/<method>` with a JSON body.
  ///
  /// The Bot API answers errors with a JSON envelope too, so the body is
  /// decoded regardless of the HTTP status.
  async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let resp = self
      .client
      .post(self.method_url(method))
      .json(body)
      .send()
      .await?;
    let envelope: ApiResponse<T> = resp.json().await?;
    envelope.into_result(method)
  }

  // ── Update delivery ───────────────────────────────────────────────────────

  /// Long-poll for updates after `offset`.
  pub async fn get_updates(&self, offset: Option<i64>) -> Result<UpdateBatch> {
    let raw: Vec<serde_json::Value> = self
      .call("getUpdates", &GetUpdates {
        offset,
        timeout: LONG_POLL_SECS,
        allowed_updates: ALLOWED_UPDATES,
      })
      .await?;
    Ok(UpdateBatch::from_raw(raw))
  }

  pub async fn set_webhook(&self, url: &str) -> Result<()> {
    let _: bool = self
      .call("setWebhook", &SetWebhook { url, allowed_updates: ALLOWED_UPDATES })
      .await?;
    tracing::info!(%url, "webhook registered");
    Ok(())
  }

  /// Remove any webhook so `getUpdates` can be used.
  pub async fn delete_webhook(&self) -> Result<()> {
    let _: bool = self
      .call("deleteWebhook", &DeleteWebhook { drop_pending_updates: false })
      .await?;
    Ok(())
  }

  pub async fn get_chat(&self, chat: &ChatId) -> Result<Chat> {
    self.call("getChat", &GetChat { chat_id: chat }).await
  }
}

// ─── ChatPlatform impl ───────────────────────────────────────────────────────

fn message_ref(message: Message) -> MessageRef {
  MessageRef { chat: ChatId::Id(message.chat.id), message_id: message.message_id }
}

impl ChatPlatform for TelegramClient {
  async fn send_message(
    &self,
    chat: &ChatId,
    message: &OutgoingMessage,
  ) -> Result<MessageRef, PlatformError> {
    let sent: Message = self
      .call("sendMessage", &SendMessage { chat_id: chat, body: message.into() })
      .await?;
    Ok(message_ref(sent))
  }

  async fn edit_message_text(
    &self,
    target: &MessageRef,
    message: &OutgoingMessage,
  ) -> Result<(), PlatformError> {
    // Returns the edited Message, or `true` for inline messages.
    let _: serde_json::Value = self
      .call("editMessageText", &EditMessageText {
        chat_id:    &target.chat,
        message_id: target.message_id,
        body:       message.into(),
      })
      .await?;
    Ok(())
  }

  async fn edit_keyboard(
    &self,
    target: &MessageRef,
    keyboard: &InlineKeyboard,
  ) -> Result<(), PlatformError> {
    let _: serde_json::Value = self
      .call("editMessageReplyMarkup", &EditMessageReplyMarkup {
        chat_id:      &target.chat,
        message_id:   target.message_id,
        reply_markup: ReplyMarkup::from(keyboard),
      })
      .await?;
    Ok(())
  }

  async fn pin_message(&self, target: &MessageRef) -> Result<(), PlatformError> {
    let _: bool = self
      .call("pinChatMessage", &PinChatMessage {
        chat_id:              &target.chat,
        message_id:           target.message_id,
        disable_notification: true,
      })
      .await?;
    Ok(())
  }

  async fn answer_callback(
    &self,
    callback_id: &str,
    text: Option<&str>,
  ) -> Result<(), PlatformError> {
    let _: bool = self
      .call("answerCallbackQuery", &AnswerCallbackQuery { callback_query_id: callback_id, text })
      .await?;
    Ok(())
  }

  async fn answer_pre_checkout(
    &self,
    query_id: &str,
    error: Option<&str>,
  ) -> Result<(), PlatformError> {
    let _: bool = self
      .call("answerPreCheckoutQuery", &AnswerPreCheckoutQuery {
        pre_checkout_query_id: query_id,
        ok:                    error.is_none(),
        error_message:         error,
      })
      .await?;
    Ok(())
  }

  async fn send_invoice(&self, user: UserId, invoice: &Invoice) -> Result<(), PlatformError> {
    let _: Message = self
      .call("sendInvoice", &SendInvoice::new(user, invoice))
      .await?;
    Ok(())
  }
}
