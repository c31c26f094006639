//! Votes and the net vote count derived from them.
//!
//! The stored `vote_count` of an idea is never adjusted incrementally by a
//! vote: it is recomputed from the full set of vote rows plus the priority
//! bonus.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  idea::{IdeaId, UserId},
};

/// Votes granted by a priority boost.
pub const PRIORITY_BONUS: i64 = 10;

/// Which way a vote was cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      VoteDirection::Up => "up",
      VoteDirection::Down => "down",
    }
  }
}

impl fmt::Display for VoteDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for VoteDirection {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "up" => Ok(VoteDirection::Up),
      "down" => Ok(VoteDirection::Down),
      other => Err(Error::UnknownDirection(other.to_owned())),
    }
  }
}

/// One user's current vote on one idea. At most one exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub voter_id:   UserId,
  pub voter_name: String,
  pub idea_id:    IdeaId,
  pub direction:  VoteDirection,
}

/// Up/down counts for a single idea.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteCounts {
  pub up:   i64,
  pub down: i64,
}

impl VoteCounts {
  /// Count the directions of `votes`.
  pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
    votes
      .into_iter()
      .fold(VoteCounts::default(), |mut acc, v| {
        match v.direction {
          VoteDirection::Up => acc.up += 1,
          VoteDirection::Down => acc.down += 1,
        }
        acc
      })
  }

  pub fn net(self) -> i64 { self.up - self.down }

  /// The value stored as an idea's `vote_count`.
  pub fn total(self, has_priority: bool) -> i64 { self.net() + priority_bonus(has_priority) }
}

pub fn priority_bonus(has_priority: bool) -> i64 {
  if has_priority { PRIORITY_BONUS } else { 0 }
}
