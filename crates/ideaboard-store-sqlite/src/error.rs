//! Error type for `ideaboard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ideaboard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected column value: {0}")]
  Decode(String),

  #[error("idea not found: {0}")]
  IdeaNotFound(i64),

  #[error("payment not found: {0}")]
  PaymentNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
