//! Priority-boost payments and the invoice payload that travels with them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  idea::{IdeaId, UserId},
};

/// Price of a priority boost, in the platform's micro-currency.
pub const BOOST_PRICE_STARS: i64 = 1;

/// Currency code of the platform's micro-currency.
pub const BOOST_CURRENCY: &str = "XTR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
  Priority,
}

impl PaymentKind {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentKind::Priority => "priority",
    }
  }
}

/// A confirmed payment. Immutable once recorded, except that `idea_id` is
/// backfilled when the payment preceded publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub id:           i64,
  pub payer_id:     UserId,
  /// `None` while the boosted idea has not been published yet.
  pub idea_id:      Option<IdeaId>,
  pub kind:         PaymentKind,
  pub amount_stars: i64,
  pub charge_id:    String,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
  pub payer_id:     UserId,
  pub idea_id:      Option<IdeaId>,
  pub kind:         PaymentKind,
  pub amount_stars: i64,
  pub charge_id:    String,
}

// ─── Invoice payload ─────────────────────────────────────────────────────────

/// Marker serialised as `"action": "publish_priority"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishAction {
  #[serde(rename = "publish_priority")]
  PublishPriority,
}

/// What a boost invoice pays for. Serialised to JSON and carried through the
/// payment platform unmodified between invoice and confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoostPayload {
  /// Publish the user's pending draft with the bonus already applied.
  PendingDraft { action: PublishAction, user_id: UserId },
  /// Boost an idea that is already published.
  Idea {
    #[serde(alias = "request_id")]
    idea_id: IdeaId,
  },
}

impl BoostPayload {
  pub fn pending_draft(user_id: UserId) -> Self {
    BoostPayload::PendingDraft { action: PublishAction::PublishPriority, user_id }
  }

  pub fn encode(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn decode(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }

  /// The idea this payment is tied to, if it is already known.
  pub fn idea_id(&self) -> Option<IdeaId> {
    match self {
      BoostPayload::PendingDraft { .. } => None,
      BoostPayload::Idea { idea_id } => Some(*idea_id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pending_draft_payload_shape() {
    let json = BoostPayload::pending_draft(99).encode().unwrap();
    assert_eq!(json, r#"{"action":"publish_priority","user_id":99}"#);
    assert_eq!(BoostPayload::decode(&json).unwrap(), BoostPayload::pending_draft(99));
  }

  #[test]
  fn idea_payload_accepts_legacy_field_name() {
    let payload = BoostPayload::decode(r#"{"request_id":7}"#).unwrap();
    assert_eq!(payload, BoostPayload::Idea { idea_id: 7 });
    assert_eq!(payload.idea_id(), Some(7));
  }

  #[test]
  fn unknown_action_is_rejected() {
    assert!(BoostPayload::decode(r#"{"action":"refund","user_id":1}"#).is_err());
    assert!(BoostPayload::decode("not json").is_err());
  }
}
