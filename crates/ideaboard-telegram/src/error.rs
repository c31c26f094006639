//! Error type for `ideaboard-telegram`.

use ideaboard_core::platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} failed ({code}): {description}")]
  Api {
    method:      &'static str,
    code:        i64,
    description: String,
  },

  #[error("{0} reported success without a result")]
  MissingResult(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for PlatformError {
  fn from(e: Error) -> Self {
    match e {
      Error::Api { description, .. } if description.contains("message is not modified") => {
        PlatformError::NotModified
      }
      Error::Api { code, description, .. }
        if code == 404 || description.contains("not found") =>
      {
        PlatformError::NotFound(description)
      }
      Error::Api { code, description, .. } => PlatformError::Api { code, description },
      other => PlatformError::Transport(Box::new(other)),
    }
  }
}
