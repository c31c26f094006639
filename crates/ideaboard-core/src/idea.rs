//! Idea records: the persisted, voteable submissions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Chat-platform user identifier.
pub type UserId = i64;

/// Store-assigned idea identifier.
pub type IdeaId = i64;

// ─── Chat references ─────────────────────────────────────────────────────────

/// A chat the bot can post to: either a numeric id or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
  Id(i64),
  Username(String),
}

impl fmt::Display for ChatId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChatId::Id(id) => write!(f, "{id}"),
      ChatId::Username(name) => f.write_str(name),
    }
  }
}

impl FromStr for ChatId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
      return Ok(ChatId::Id(id));
    }
    match s.strip_prefix('@') {
      Some(name) if !name.is_empty() => Ok(ChatId::Username(s.to_owned())),
      _ => Err(Error::InvalidChatId(s.to_owned())),
    }
  }
}

impl From<i64> for ChatId {
  fn from(id: i64) -> Self { ChatId::Id(id) }
}

/// Location of a message the bot sent and may later edit or pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
  pub chat:       ChatId,
  pub message_id: i64,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A published idea as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
  pub id:           IdeaId,
  pub owner_id:     UserId,
  pub display_name: String,
  pub short_text:   String,
  pub full_text:    String,
  /// Net votes plus the priority bonus; see [`crate::tally`].
  pub vote_count:   i64,
  pub has_priority: bool,
  /// Set once the channel post has been sent.
  pub channel_post: Option<MessageRef>,
  pub created_at:   DateTime<Utc>,
}

/// Input for [`IdeaStore::create_idea`](crate::store::IdeaStore::create_idea).
/// The id and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewIdea {
  pub owner_id:     UserId,
  pub display_name: String,
  pub short_text:   String,
  pub full_text:    String,
  pub vote_count:   i64,
  pub has_priority: bool,
}
