//! Error type for `ideaboard-llm`.

use ideaboard_core::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("completion request → {status}: {body}")]
  Status { status: u16, body: String },

  #[error("completion has no content")]
  NoContent,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for ModelError {
  fn from(e: Error) -> Self {
    match e {
      Error::Status { status, body } => ModelError::Rejected { status, body },
      Error::NoContent => ModelError::EmptyReply,
      other => ModelError::Transport(Box::new(other)),
    }
  }
}
