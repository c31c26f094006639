//! Error types for `ideaboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown vote direction: {0:?}")]
  UnknownDirection(String),

  #[error("unknown pinned post kind: {0:?}")]
  UnknownPinnedKind(String),

  #[error("invalid chat id: {0:?}")]
  InvalidChatId(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
