//! Error type for `ideaboard-store-rest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ideaboard_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {table} → {status}: {body}")]
  Status {
    method: &'static str,
    table:  &'static str,
    status: u16,
    body:   String,
  },

  #[error("{0} returned no row")]
  EmptyResponse(&'static str),

  #[error("idea not found: {0}")]
  IdeaNotFound(i64),

  #[error("payment not found: {0}")]
  PaymentNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
