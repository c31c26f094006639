//! Outgoing message shapes: text, inline keyboards and invoices.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
  /// Opaque identifier echoed back in a callback event.
  Callback(String),
  Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
  pub text:   String,
  pub action: ButtonAction,
}

impl InlineButton {
  pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
    Self { text: text.into(), action: ButtonAction::Callback(data.into()) }
  }

  pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
    Self { text: text.into(), action: ButtonAction::Url(url.into()) }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
  pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
  pub fn new() -> Self { Self::default() }

  pub fn row(mut self, row: Vec<InlineButton>) -> Self {
    self.rows.push(row);
    self
  }

  /// All buttons in display order.
  pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> { self.rows.iter().flatten() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
  Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
  pub text:             String,
  pub parse_mode:       Option<ParseMode>,
  pub keyboard:         Option<InlineKeyboard>,
  pub disable_previews: bool,
}

impl OutgoingMessage {
  /// Plain text, no markup.
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text:             text.into(),
      parse_mode:       None,
      keyboard:         None,
      disable_previews: false,
    }
  }

  pub fn html(text: impl Into<String>) -> Self {
    Self { parse_mode: Some(ParseMode::Html), ..Self::text(text) }
  }

  pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
    self.keyboard = Some(keyboard);
    self
  }

  pub fn without_previews(mut self) -> Self {
    self.disable_previews = true;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPrice {
  pub label:  String,
  pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
  pub title:       String,
  pub description: String,
  /// Returned verbatim with the payment confirmation.
  pub payload:     String,
  pub currency:    String,
  pub prices:      Vec<LabeledPrice>,
}
