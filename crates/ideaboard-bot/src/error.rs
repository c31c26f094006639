//! Error type for the bot services.

use ideaboard_core::{idea::IdeaId, platform::PlatformError};
use thiserror::Error;

/// Failure of a service call. User-input cases (too short, duplicate vote,
/// missing draft) are outcomes, not errors.
#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("platform error: {0}")]
  Platform(#[from] PlatformError),

  #[error(transparent)]
  Core(#[from] ideaboard_core::Error),

  #[error("idea not found: {0}")]
  IdeaNotFound(IdeaId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}
