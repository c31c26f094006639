//! Button callback identifiers.
//!
//! Every callback the bot can receive was produced by one of its own buttons,
//! so the set is closed: `publish_free`, `publish_priority`,
//! `vote_{up|down}_{id}` and `pay_priority_{id}`.

use std::{fmt, str::FromStr};

use crate::{idea::IdeaId, tally::VoteDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
  PublishFree,
  PublishPriority,
  Vote { direction: VoteDirection, idea_id: IdeaId },
  Boost { idea_id: IdeaId },
}

impl fmt::Display for Callback {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Callback::PublishFree => f.write_str("publish_free"),
      Callback::PublishPriority => f.write_str("publish_priority"),
      Callback::Vote { direction, idea_id } => write!(f, "vote_{direction}_{idea_id}"),
      Callback::Boost { idea_id } => write!(f, "pay_priority_{idea_id}"),
    }
  }
}

/// A callback string this bot never produces.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised callback data: {0:?}")]
pub struct UnknownCallback(pub String);

impl FromStr for Callback {
  type Err = UnknownCallback;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let unknown = || UnknownCallback(s.to_owned());
    match s {
      "publish_free" => return Ok(Callback::PublishFree),
      "publish_priority" => return Ok(Callback::PublishPriority),
      _ => {}
    }

    let mut parts = s.splitn(3, '_');
    let (Some(action), Some(sub), Some(id)) = (parts.next(), parts.next(), parts.next())
    else {
      return Err(unknown());
    };
    let idea_id: IdeaId = id.parse().map_err(|_| unknown())?;

    match (action, sub) {
      ("vote", dir) => {
        let direction = dir.parse().map_err(|_| unknown())?;
        Ok(Callback::Vote { direction, idea_id })
      }
      ("pay", "priority") => Ok(Callback::Boost { idea_id }),
      _ => Err(unknown()),
    }
  }
}
