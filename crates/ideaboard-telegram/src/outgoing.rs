//! Request bodies for the Bot API methods the client calls.

use ideaboard_core::{
  idea::ChatId,
  markup::{ButtonAction, InlineKeyboard, Invoice, OutgoingMessage, ParseMode},
};
use serde::Serialize;

/// Update kinds the bot subscribes to.
pub const ALLOWED_UPDATES: &[&str] = &["message", "callback_query", "pre_checkout_query"];

// ─── Markup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReplyMarkup {
  pub inline_keyboard: Vec<Vec<Button>>,
}

#[derive(Debug, Serialize)]
pub struct Button {
  pub text:          String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub callback_data: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url:           Option<String>,
}

impl From<&InlineKeyboard> for ReplyMarkup {
  fn from(keyboard: &InlineKeyboard) -> Self {
    let inline_keyboard = keyboard
      .rows
      .iter()
      .map(|row| {
        row
          .iter()
          .map(|b| {
            let (callback_data, url) = match &b.action {
              ButtonAction::Callback(data) => (Some(data.clone()), None),
              ButtonAction::Url(url) => (None, Some(url.clone())),
            };
            Button { text: b.text.clone(), callback_data, url }
          })
          .collect()
      })
      .collect();
    Self { inline_keyboard }
  }
}

#[derive(Debug, Serialize)]
pub struct LinkPreviewOptions {
  pub is_disabled: bool,
}

fn parse_mode_name(mode: ParseMode) -> &'static str {
  match mode {
    ParseMode::Html => "HTML",
  }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Fields shared by `sendMessage` and `editMessageText`.
#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
  pub text:                 &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parse_mode:           Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reply_markup:         Option<ReplyMarkup>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link_preview_options: Option<LinkPreviewOptions>,
}

impl<'a> From<&'a OutgoingMessage> for MessageBody<'a> {
  fn from(m: &'a OutgoingMessage) -> Self {
    Self {
      text:                 &m.text,
      parse_mode:           m.parse_mode.map(parse_mode_name),
      reply_markup:         m.keyboard.as_ref().map(ReplyMarkup::from),
      link_preview_options: m
        .disable_previews
        .then_some(LinkPreviewOptions { is_disabled: true }),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
  pub chat_id: &'a ChatId,
  #[serde(flatten)]
  pub body:    MessageBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
  pub chat_id:    &'a ChatId,
  pub message_id: i64,
  #[serde(flatten)]
  pub body:       MessageBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageReplyMarkup<'a> {
  pub chat_id:      &'a ChatId,
  pub message_id:   i64,
  pub reply_markup: ReplyMarkup,
}

#[derive(Debug, Serialize)]
pub struct PinChatMessage<'a> {
  pub chat_id:              &'a ChatId,
  pub message_id:           i64,
  pub disable_notification: bool,
}

// ─── Callbacks and payments ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
  pub callback_query_id: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text:              Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct AnswerPreCheckoutQuery<'a> {
  pub pre_checkout_query_id: &'a str,
  pub ok:                    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_message:         Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct Price<'a> {
  pub label:  &'a str,
  pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct SendInvoice<'a> {
  pub chat_id:        i64,
  pub title:          &'a str,
  pub description:    &'a str,
  pub payload:        &'a str,
  /// Empty for payments in Telegram Stars.
  pub provider_token: &'a str,
  pub currency:       &'a str,
  pub prices:         Vec<Price<'a>>,
}

impl<'a> SendInvoice<'a> {
  pub fn new(chat_id: i64, invoice: &'a Invoice) -> Self {
    Self {
      chat_id,
      title: &invoice.title,
      description: &invoice.description,
      payload: &invoice.payload,
      provider_token: "",
      currency: &invoice.currency,
      prices: invoice
        .prices
        .iter()
        .map(|p| Price { label: &p.label, amount: p.amount })
        .collect(),
    }
  }
}

// ─── Update delivery ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GetUpdates {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub offset:          Option<i64>,
  pub timeout:         u64,
  pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SetWebhook<'a> {
  pub url:             &'a str,
  pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct DeleteWebhook {
  pub drop_pending_updates: bool,
}

#[derive(Debug, Serialize)]
pub struct GetChat<'a> {
  pub chat_id: &'a ChatId,
}
