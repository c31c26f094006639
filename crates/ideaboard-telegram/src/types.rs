//! Inbound Bot API objects. Only the fields the bot reads are modelled;
//! everything else in the JSON is ignored.

use serde::Deserialize;
use serde_json::Value;

/// The `{ok, result, description, error_code}` envelope of every reply.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
  pub ok:          bool,
  pub result:      Option<T>,
  pub description: Option<String>,
  pub error_code:  Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
  pub update_id:          i64,
  pub message:            Option<Message>,
  pub callback_query:     Option<CallbackQuery>,
  pub pre_checkout_query: Option<PreCheckoutQuery>,
}

/// One `getUpdates` result.
///
/// Elements are decoded one by one, so an update this model cannot read is
/// dropped on its own while the offset still moves past it.
#[derive(Debug, Default)]
pub struct UpdateBatch {
  pub updates:     Vec<Update>,
  /// One past the highest `update_id` seen, decodable or not.
  pub next_offset: Option<i64>,
}

impl UpdateBatch {
  pub fn from_raw(raw: Vec<Value>) -> Self {
    let mut batch = Self::default();
    for value in raw {
      let Some(update_id) = value.get("update_id").and_then(Value::as_i64) else {
        tracing::warn!(%value, "update without update_id");
        continue;
      };
      batch.next_offset = batch.next_offset.max(Some(update_id + 1));
      match serde_json::from_value::<Update>(value) {
        Ok(update) => batch.updates.push(update),
        Err(e) => tracing::warn!(update_id, error = %e, "skipping undecodable update"),
      }
    }
    batch
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub id:         i64,
  #[serde(default)]
  pub is_bot:     bool,
  pub first_name: String,
  pub username:   Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
  pub id:       i64,
  #[serde(rename = "type")]
  pub kind:     String,
  pub title:    Option<String>,
  pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
  pub message_id:         i64,
  pub from:               Option<User>,
  pub chat:               Chat,
  pub text:               Option<String>,
  pub successful_payment: Option<SuccessfulPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
  pub id:      String,
  pub from:    User,
  /// Also present, with fewer fields, when the message is inaccessible.
  pub message: Option<Message>,
  pub data:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreCheckoutQuery {
  pub id:              String,
  pub from:            User,
  pub currency:        String,
  pub total_amount:    i64,
  pub invoice_payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuccessfulPayment {
  pub currency:                   String,
  pub total_amount:               i64,
  pub invoice_payload:            String,
  pub telegram_payment_charge_id: String,
}
