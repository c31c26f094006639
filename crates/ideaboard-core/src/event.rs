//! Inbound events, already stripped of platform-specific envelopes.

use crate::{
  draft::Author,
  idea::{MessageRef, UserId},
};

#[derive(Debug, Clone)]
pub struct CallbackEvent {
  /// Platform id used to acknowledge the press.
  pub id:      String,
  pub from:    Author,
  pub data:    String,
  /// The message carrying the pressed button, when the platform reports it.
  pub message: Option<MessageRef>,
}

#[derive(Debug, Clone)]
pub struct PreCheckout {
  pub id:      String,
  pub from:    UserId,
  pub payload: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
  pub payer:        Author,
  pub payload:      String,
  pub total_amount: i64,
  pub charge_id:    String,
}

#[derive(Debug, Clone)]
pub enum Event {
  Start { from: Author },
  Text { from: Author, text: String },
  Callback(CallbackEvent),
  PreCheckout(PreCheckout),
  PaymentConfirmed(PaymentConfirmation),
}

impl Event {
  /// The user who triggered the event.
  pub fn user_id(&self) -> UserId {
    match self {
      Event::Start { from } | Event::Text { from, .. } => from.user_id,
      Event::Callback(cb) => cb.from.user_id,
      Event::PreCheckout(q) => q.from,
      Event::PaymentConfirmed(p) => p.payer.user_id,
    }
  }
}
