//! JSON row shapes exchanged with PostgREST, and their conversions.

use chrono::{DateTime, Utc};
use ideaboard_core::{
  idea::{Idea, MessageRef, NewIdea},
  payment::{NewPayment, Payment, PaymentKind},
  store::{PinnedKind, PinnedPost},
  tally::{Vote, VoteDirection},
};
use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Ideas ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IdeaRow {
  pub id:                 i64,
  pub owner_id:           i64,
  pub display_name:       String,
  pub short_text:         String,
  pub full_text:          String,
  pub vote_count:         i64,
  pub has_priority:       bool,
  pub channel_chat_id:    Option<String>,
  pub channel_message_id: Option<i64>,
  pub created_at:         DateTime<Utc>,
}

impl IdeaRow {
  pub fn into_idea(self) -> Result<Idea> {
    let channel_post = match (self.channel_chat_id, self.channel_message_id) {
      (Some(chat), Some(message_id)) => Some(MessageRef { chat: chat.parse()?, message_id }),
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
      created_at: self.created_at,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct NewIdeaRow<'a> {
  pub owner_id:     i64,
  pub display_name: &'a str,
  pub short_text:   &'a str,
  pub full_text:    &'a str,
  pub vote_count:   i64,
  pub has_priority: bool,
}

impl<'a> From<&'a NewIdea> for NewIdeaRow<'a> {
  fn from(i: &'a NewIdea) -> Self {
    Self {
      owner_id:     i.owner_id,
      display_name: &i.display_name,
      short_text:   &i.short_text,
      full_text:    &i.full_text,
      vote_count:   i.vote_count,
      has_priority: i.has_priority,
    }
  }
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRow {
  pub voter_id:   i64,
  pub voter_name: String,
  pub idea_id:    i64,
  pub direction:  VoteDirection,
}

impl From<VoteRow> for Vote {
  fn from(r: VoteRow) -> Self {
    Vote {
      voter_id:   r.voter_id,
      voter_name: r.voter_name,
      idea_id:    r.idea_id,
      direction:  r.direction,
    }
  }
}

impl From<Vote> for VoteRow {
  fn from(v: Vote) -> Self {
    VoteRow {
      voter_id:   v.voter_id,
      voter_name: v.voter_name,
      idea_id:    v.idea_id,
      direction:  v.direction,
    }
  }
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaymentRow {
  pub id:           i64,
  pub payer_id:     i64,
  pub idea_id:      Option<i64>,
  pub kind:         PaymentKind,
  pub amount_stars: i64,
  pub charge_id:    String,
  pub created_at:   DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
  fn from(r: PaymentRow) -> Self {
    Payment {
      id:           r.id,
      payer_id:     r.payer_id,
      idea_id:      r.idea_id,
      kind:         r.kind,
      amount_stars: r.amount_stars,
      charge_id:    r.charge_id,
      created_at:   r.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct NewPaymentRow<'a> {
  pub payer_id:     i64,
  pub idea_id:      Option<i64>,
  pub kind:         PaymentKind,
  pub amount_stars: i64,
  pub charge_id:    &'a str,
}

impl<'a> From<&'a NewPayment> for NewPaymentRow<'a> {
  fn from(p: &'a NewPayment) -> Self {
    Self {
      payer_id:     p.payer_id,
      idea_id:      p.idea_id,
      kind:         p.kind,
      amount_stars: p.amount_stars,
      charge_id:    &p.charge_id,
    }
  }
}

// ─── Pinned posts ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PinnedRow {
  pub kind:       PinnedKind,
  pub chat_id:    String,
  pub message_id: i64,
}

impl PinnedRow {
  pub fn into_pinned(self) -> Result<PinnedPost> {
    Ok(PinnedPost {
      kind:    self.kind,
      message: MessageRef { chat: self.chat_id.parse()?, message_id: self.message_id },
    })
  }
}

impl From<&PinnedPost> for PinnedRow {
  fn from(p: &PinnedPost) -> Self {
    PinnedRow {
      kind:       p.kind,
      chat_id:    p.message.chat.to_string(),
      message_id: p.message.message_id,
    }
  }
}
