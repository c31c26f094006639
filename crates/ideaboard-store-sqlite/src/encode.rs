//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, chat ids as their display form
//! (`-100…` or `@name`), booleans as 0/1 integers.

use chrono::{DateTime, Utc};
use ideaboard_core::{
  idea::{ChatId, Idea, MessageRef},
  payment::{Payment, PaymentKind},
  store::{PinnedKind, PinnedPost},
  tally::{Vote, VoteDirection},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_payment_kind(k: PaymentKind) -> &'static str { k.as_str() }

pub fn decode_payment_kind(s: &str) -> Result<PaymentKind> {
  match s {
    "priority" => Ok(PaymentKind::Priority),
    other => Err(Error::Decode(format!("unknown payment kind: {other:?}"))),
  }
}

pub fn decode_direction(s: &str) -> Result<VoteDirection> { Ok(s.parse()?) }

pub fn decode_chat_id(s: &str) -> Result<ChatId> { Ok(s.parse()?) }

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const IDEA_COLUMNS: &str = "id, owner_id, display_name, short_text, full_text, vote_count, \
                                has_priority, channel_chat_id, channel_message_id, created_at";

/// An `ideas` row as read from SQLite, before decoding.
pub struct RawIdea {
  pub id:                 i64,
  pub owner_id:           i64,
  pub display_name:       String,
  pub short_text:         String,
  pub full_text:          String,
  pub vote_count:         i64,
  pub has_priority:       bool,
  pub channel_chat_id:    Option<String>,
  pub channel_message_id: Option<i64>,
  pub created_at:         String,
}

impl RawIdea {
  /// Map a row selected with [`IDEA_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      owner_id:           row.get(1)?,
      display_name:       row.get(2)?,
      short_text:         row.get(3)?,
      full_text:          row.get(4)?,
      vote_count:         row.get(5)?,
      has_priority:       row.get(6)?,
      channel_chat_id:    row.get(7)?,
      channel_message_id: row.get(8)?,
      created_at:         row.get(9)?,
    })
  }

  pub fn into_idea(self) -> Result<Idea> {
    let channel_post = match (self.channel_chat_id, self.channel_message_id) {
      (Some(chat), Some(message_id)) => Some(MessageRef { chat: decode_chat_id(&chat)?, message_id }),
      _ => None,
    };
    Ok(Idea {
      id: self.id,
      owner_id: self.owner_id,
      display_name: self.display_name,
      short_text: self.short_text,
      full_text: self.full_text,
      vote_count: self.vote_count,
      has_priority: self.has_priority,
      channel_post,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawVote {
  pub voter_id:   i64,
  pub voter_name: String,
  pub idea_id:    i64,
  pub direction:  String,
}

impl RawVote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      voter_id:   row.get(0)?,
      voter_name: row.get(1)?,
      idea_id:    row.get(2)?,
      direction:  row.get(3)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      voter_id:   self.voter_id,
      voter_name: self.voter_name,
      idea_id:    self.idea_id,
      direction:  decode_direction(&self.direction)?,
    })
  }
}

pub struct RawPayment {
  pub id:           i64,
  pub payer_id:     i64,
  pub idea_id:      Option<i64>,
  pub kind:         String,
  pub amount_stars: i64,
  pub charge_id:    String,
  pub created_at:   String,
}

impl RawPayment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      payer_id:     row.get(1)?,
      idea_id:      row.get(2)?,
      kind:         row.get(3)?,
      amount_stars: row.get(4)?,
      charge_id:    row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_payment(self) -> Result<Payment> {
    Ok(Payment {
      id:           self.id,
      payer_id:     self.payer_id,
      idea_id:      self.idea_id,
      kind:         decode_payment_kind(&self.kind)?,
      amount_stars: self.amount_stars,
      charge_id:    self.charge_id,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawPinned {
  pub kind:       String,
  pub chat_id:    String,
  pub message_id: i64,
}

impl RawPinned {
  pub fn into_pinned(self) -> Result<PinnedPost> {
    Ok(PinnedPost {
      kind:    self.kind.parse::<PinnedKind>()?,
      message: MessageRef { chat: decode_chat_id(&self.chat_id)?, message_id: self.message_id },
    })
  }
}
